// Copyright 2021 Centrifuge Foundation (centrifuge.io).
//
// This file is part of the Centrifuge chain project.
// Centrifuge is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version (see http://www.gnu.org/licenses).
// Centrifuge is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

//! Claim and association state machine.
//!
//! ```text
//! Idle ─┬─> AwaitingAssociationProof ──> SubmittingAssociation ─┬─> Finalized
//!       └─> AwaitingClaimSubmission ───> SubmittingClaim ───────┘
//!                         (any step) ──> Failed
//! ```
//!
//! One session at a time. Balance deltas reach the cache only once the chain
//! finalizes the extrinsic; rejections meaning "already done" complete the
//! session with a zero delta instead of failing it.
//!
//! An extrinsic that may have reached the node keeps blocking new sessions
//! even when nobody listens to it any more, see [`ClaimOrchestrator::detach`].

use std::collections::BTreeMap;

use crowdloan_traits::{
	ChainError, ClaimNotifier, CrowdloanRewardsApi, Notification, TransactionEvent,
};
use crowdloan_types::{
	Association, AssociationMode, AssociationStatus, Balance, ClaimMode, Moment, RemoteAccount,
	RewardsError, SignatureScheme, ValidityError,
};
use futures::{Stream, StreamExt};
use sp_core::H256;
use sp_runtime::Perbill;
use tokio::time::Instant;

use crate::{
	config::ClaimConfiguration,
	eligibility::{check_eligibility, Eligibility, EligibleClaim, IneligibleReason, WalletConnection},
	proof::{build_proof, verify_proof, ProofError, Signers},
	vesting::{compute_claimable, unlocked_at, AssociationProgress},
	LOG_TARGET,
};

pub mod cache;
pub mod session;


pub use cache::AllocationCache;
pub use session::ClaimSession;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ClaimError {
	#[error("{}", .0.message())]
	NotEligible(IneligibleReason),

	#[error("A claim is already in progress")]
	SessionAlreadyActive,

	#[error("No wallet able to sign for this account is connected")]
	SigningUnavailable,

	#[error("Signing request rejected by the user")]
	UserRejected,

	#[error("Signing failed: {0}")]
	SigningFailed(String),

	#[error("Wallet returned {actual} bytes, a {expected:?} signature has {}", .expected.signature_len())]
	SignatureSchemeMismatch {
		expected: SignatureScheme,
		actual: usize,
	},

	#[error("The connected wallet is not the account that contributed to the crowdloan")]
	WrongAddress,

	#[error("Submission rejected: {0}")]
	SubmissionRejected(String),

	#[error("Chain query failed: {0}")]
	QueryFailed(String),

	#[error("No finalization observed in time")]
	Timeout,

	#[error("No submission in flight")]
	NoActiveSubmission,
}

impl From<ProofError> for ClaimError {
	fn from(error: ProofError) -> Self {
		match error {
			ProofError::SigningUnavailable => ClaimError::SigningUnavailable,
			ProofError::UserRejected => ClaimError::UserRejected,
			ProofError::SignatureSchemeMismatch { expected, actual } => {
				ClaimError::SignatureSchemeMismatch { expected, actual }
			}
			ProofError::SigningFailed(reason) => ClaimError::SigningFailed(reason),
			ProofError::WrongAddress => ClaimError::WrongAddress,
		}
	}
}

/// Maps a non-benign chain rejection. Callers handle
/// [`ChainError::is_benign`] before converting.
impl From<ChainError> for ClaimError {
	fn from(error: ChainError) -> Self {
		match error {
			ChainError::Signing(error) => ProofError::from(error).into(),
			error if error.is_wrong_address() => ClaimError::WrongAddress,
			error => ClaimError::SubmissionRejected(error.to_string()),
		}
	}
}

fn query_failed(error: ChainError) -> ClaimError {
	ClaimError::QueryFailed(error.to_string())
}

/// What the user asked for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimRequest {
	pub mode: AssociationMode,
	pub wallet: WalletConnection,
}

/// How a completed session took effect.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Resolution {
	/// The submitted extrinsic was finalized.
	Applied,
	/// The remote account was associated already.
	AlreadyAssociated,
	/// Nothing was unlocked.
	NothingToClaim,
}

impl Resolution {
	fn from_benign(error: &ChainError) -> Self {
		match error {
			ChainError::InvalidTransaction(ValidityError::AlreadyAssociated) |
			ChainError::Dispatch(RewardsError::AlreadyAssociated) => Resolution::AlreadyAssociated,
			_ => Resolution::NothingToClaim,
		}
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClaimOutcome {
	pub mode: ClaimMode,
	pub remote: RemoteAccount,
	/// `None` when the session completed without submitting.
	pub tx_hash: Option<H256>,
	/// Amount folded into the cached `claimed`.
	pub delta: Balance,
	pub resolution: Resolution,
}

/// Result of [`ClaimOrchestrator::start`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Submission {
	/// Submitted; drive it with [`ClaimOrchestrator::on_event`] or
	/// [`ClaimOrchestrator::watch`].
	Pending(H256),
	/// Completed without anything left to watch.
	Completed(ClaimOutcome),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClaimState {
	Idle,
	AwaitingAssociationProof,
	SubmittingAssociation { tx_hash: H256 },
	AwaitingClaimSubmission,
	SubmittingClaim { tx_hash: H256 },
	Finalized(ClaimOutcome),
	Failed(ClaimError),
}

impl ClaimState {
	/// Whether a session is in flight. Only then new sessions are refused.
	pub fn is_active(&self) -> bool {
		matches!(
			self,
			ClaimState::AwaitingAssociationProof |
				ClaimState::SubmittingAssociation { .. } |
				ClaimState::AwaitingClaimSubmission |
				ClaimState::SubmittingClaim { .. }
		)
	}
}

/// Submission nobody watches any more that may still land on chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Unresolved {
	/// `None` when the node never answered the submission.
	tx_hash: Option<H256>,
	until: Instant,
}

pub struct ClaimOrchestrator {
	config: ClaimConfiguration,
	api: Box<dyn CrowdloanRewardsApi>,
	signers: Signers,
	notifier: Box<dyn ClaimNotifier>,
	state: ClaimState,
	session: Option<ClaimSession>,
	unresolved: Option<Unresolved>,
	cache: AllocationCache,
}

impl ClaimOrchestrator {
	pub fn new(
		config: ClaimConfiguration,
		api: Box<dyn CrowdloanRewardsApi>,
		signers: Signers,
		notifier: Box<dyn ClaimNotifier>,
	) -> Self {
		Self {
			config,
			api,
			signers,
			notifier,
			state: ClaimState::Idle,
			session: None,
			unresolved: None,
			cache: AllocationCache::default(),
		}
	}

	pub fn state(&self) -> &ClaimState {
		&self.state
	}

	pub fn session(&self) -> Option<&ClaimSession> {
		self.session.as_ref()
	}

	pub fn cache(&self) -> &AllocationCache {
		&self.cache
	}

	/// Whether a new session would be refused: one is running, or a detached
	/// or timed out submission may still be included.
	pub fn in_flight(&mut self) -> bool {
		if let Some(unresolved) = self.unresolved {
			if Instant::now() >= unresolved.until {
				log::debug!(
					target: LOG_TARGET,
					"Giving up on unresolved submission {:?}",
					unresolved.tx_hash,
				);
				self.unresolved = None;
			}
		}

		self.state.is_active() || self.unresolved.is_some()
	}

	/// Whether eligibility must be recomputed, clearing the flag.
	pub fn take_eligibility_stale(&mut self) -> bool {
		self.cache.take_eligibility_stale()
	}

	/// Start an association or claim.
	///
	/// Re-reads the chain, runs the eligibility gate, signs if an association
	/// is needed and submits. Refused with [`ClaimError::SessionAlreadyActive`]
	/// while another session is in flight; that refusal leaves the running
	/// session untouched. Any other error fails the session.
	///
	/// Dropping the returned future leaves the session in its awaiting state;
	/// call [`Self::detach`] when tearing down.
	pub async fn start(&mut self, request: ClaimRequest) -> Result<Submission, ClaimError> {
		if self.in_flight() {
			log::warn!(
				target: LOG_TARGET,
				"Refusing {:?} session, another one is {:?} (unresolved {:?})",
				request.mode,
				self.state,
				self.unresolved,
			);
			return Err(ClaimError::SessionAlreadyActive);
		}

		self.state = ClaimState::Idle;
		self.session = None;

		match self.run(request).await {
			Ok(submission) => Ok(submission),
			Err(error) => Err(self.fail(error)),
		}
	}

	async fn run(&mut self, request: ClaimRequest) -> Result<Submission, ClaimError> {
		let claim = match self.load_eligibility(&request).await? {
			Eligibility::Eligible(claim) => claim,
			Eligibility::Ineligible(reason) => return Err(ClaimError::NotEligible(reason)),
		};

		log::info!(
			target: LOG_TARGET,
			"Starting {:?} for {:?}",
			claim.step,
			claim.remote,
		);

		let initial_payment = self.api.initial_payment().await.map_err(query_failed)?;

		match claim.step {
			ClaimMode::Associate => self.associate(claim, initial_payment).await,
			ClaimMode::Claim => self.claim(claim, initial_payment).await,
		}
	}

	async fn load_eligibility(&mut self, request: &ClaimRequest) -> Result<Eligibility, ClaimError> {
		let association = match &request.wallet.reward_account {
			Some(account) => self.api.association(account).await.map_err(query_failed)?,
			None => None,
		};

		let mut contributions = BTreeMap::new();
		for remote in request
			.wallet
			.candidates()
			.into_iter()
			.chain(association.clone())
		{
			if contributions.contains_key(&remote) {
				continue;
			}

			if let Some(allocation) = self.api.reward(&remote).await.map_err(query_failed)? {
				contributions.insert(remote, allocation);
			}
		}

		if let (Some(remote), Some(reward_account)) = (&association, &request.wallet.reward_account)
		{
			self.cache.refresh_association(Association {
				remote: remote.clone(),
				reward_account: reward_account.clone(),
				status: AssociationStatus::Confirmed,
			});
		}

		Ok(check_eligibility(
			&request.wallet,
			request.mode,
			association.as_ref(),
			&contributions,
		))
	}

	async fn associate(
		&mut self,
		claim: EligibleClaim,
		initial_payment: Perbill,
	) -> Result<Submission, ClaimError> {
		let expected = compute_claimable(
			&claim.allocation,
			initial_payment,
			AssociationProgress::NotAssociated,
		);

		self.cache
			.refresh(claim.remote.clone(), claim.allocation, expected);
		self.session = Some(ClaimSession::new(
			ClaimMode::Associate,
			claim.remote.clone(),
			claim.reward_account.clone(),
			expected,
		));
		self.state = ClaimState::AwaitingAssociationProof;

		let signed = tokio::time::timeout(
			self.config.signing_timeout(),
			build_proof(
				&self.config.proof_prefix,
				&claim.remote,
				&claim.reward_account,
				&self.signers,
			),
		)
		.await
		.map_err(|_| ClaimError::Timeout)??;

		verify_proof(&self.config.proof_prefix, &claim.reward_account, &signed)?;

		let proof = signed.proof.clone();
		if let Some(session) = self.session.as_mut() {
			session.proof = Some(signed);
		}

		let submitted = self
			.api
			.submit_associate(claim.reward_account, proof)
			.await;

		self.submitted(submitted, |tx_hash| ClaimState::SubmittingAssociation {
			tx_hash,
		})
	}

	async fn claim(
		&mut self,
		claim: EligibleClaim,
		initial_payment: Perbill,
	) -> Result<Submission, ClaimError> {
		let available = self
			.api
			.available_to_claim(&claim.reward_account)
			.await
			.map_err(query_failed)?;
		let expected = compute_claimable(
			&claim.allocation,
			initial_payment,
			AssociationProgress::Associated {
				unlocked: claim.allocation.claimed.saturating_add(available),
			},
		);

		self.cache
			.refresh(claim.remote.clone(), claim.allocation, expected);
		let session = ClaimSession::new(
			ClaimMode::Claim,
			claim.remote.clone(),
			claim.reward_account.clone(),
			expected,
		);

		if expected == 0 {
			log::warn!(
				target: LOG_TARGET,
				"Nothing unlocked for {:?}, not submitting a claim",
				claim.remote,
			);
			return Ok(Submission::Completed(self.complete(
				session,
				0,
				Resolution::NothingToClaim,
			)));
		}

		self.session = Some(session);
		self.state = ClaimState::AwaitingClaimSubmission;

		// The wallet prompts for the extrinsic signature here.
		let submitted = match tokio::time::timeout(
			self.config.signing_timeout(),
			self.api.submit_claim(claim.reward_account),
		)
		.await
		{
			Ok(submitted) => submitted,
			Err(_) => {
				// The node may have accepted it after all.
				self.hold_unresolved(None);
				return Err(ClaimError::Timeout);
			}
		};

		self.submitted(submitted, |tx_hash| ClaimState::SubmittingClaim { tx_hash })
	}

	fn submitted(
		&mut self,
		result: Result<H256, ChainError>,
		submitting: fn(H256) -> ClaimState,
	) -> Result<Submission, ClaimError> {
		match result {
			Ok(tx_hash) => {
				log::info!(target: LOG_TARGET, "Submitted extrinsic {:?}", tx_hash);

				if let Some(session) = self.session.as_mut() {
					session.tx_hash = Some(tx_hash);
				}
				self.state = submitting(tx_hash);

				Ok(Submission::Pending(tx_hash))
			}
			Err(error) if error.is_benign() => {
				log::warn!(
					target: LOG_TARGET,
					"Submission refused as already done: {}",
					error,
				);

				let session = self.session.take().ok_or(ClaimError::NoActiveSubmission)?;
				Ok(Submission::Completed(self.complete(
					session,
					0,
					Resolution::from_benign(&error),
				)))
			}
			Err(error) => Err(error.into()),
		}
	}

	/// Feed a lifecycle event of a submitted extrinsic.
	///
	/// Returns the session result once the event resolves it. Events for a
	/// transaction no session watches, including after [`Self::detach`], are
	/// ignored.
	pub fn on_event(&mut self, event: TransactionEvent) -> Option<Result<ClaimOutcome, ClaimError>> {
		let tx_hash = event.tx_hash();
		let watching = self
			.session
			.as_ref()
			.map_or(false, |session| session.is_watching(&tx_hash));

		if !watching {
			self.resolve_unresolved(&event);

			log::debug!(
				target: LOG_TARGET,
				"Ignoring {:?}, no session watches it",
				event,
			);
			return None;
		}

		match event {
			TransactionEvent::Broadcast(_) | TransactionEvent::InBlock(_) => {
				self.notify_processing();
				None
			}
			TransactionEvent::Finalized { claimed, .. } => {
				self.notify_processing();

				let session = self.session.take()?;
				let delta = claimed.unwrap_or(session.expected_delta);

				Some(Ok(self.complete(session, delta, Resolution::Applied)))
			}
			TransactionEvent::Error { error, .. } if error.is_benign() => {
				log::warn!(
					target: LOG_TARGET,
					"Extrinsic {:?} refused as already done: {}",
					tx_hash,
					error,
				);

				let session = self.session.take()?;

				Some(Ok(self.complete(session, 0, Resolution::from_benign(&error))))
			}
			TransactionEvent::Error { error, .. } => Some(Err(self.fail(error.into()))),
		}
	}

	/// The finalization window of `tx_hash` elapsed.
	pub fn on_timeout(&mut self, tx_hash: H256) -> Option<ClaimError> {
		let watching = self
			.session
			.as_ref()
			.map_or(false, |session| session.is_watching(&tx_hash));

		if !watching {
			if self.unresolved.map_or(false, |u| u.tx_hash == Some(tx_hash)) {
				self.unresolved = None;
			}
			return None;
		}

		Some(self.fail(ClaimError::Timeout))
	}

	/// Stop listening, e.g. because the claim UI closed. The extrinsic is not
	/// cancelled; its later events never touch the cache nor notify.
	///
	/// A session whose extrinsic may have reached the node keeps new sessions
	/// out until that extrinsic resolves, its [`Self::on_timeout`] fires or the
	/// finalization window elapses.
	pub fn detach(&mut self) {
		if let Some(session) = self.session.take() {
			let maybe_submitted = session.tx_hash.is_some() ||
				session.proof.is_some() ||
				self.state == ClaimState::AwaitingClaimSubmission;

			log::warn!(
				target: LOG_TARGET,
				"Detached from {:?} session, extrinsic {:?} stays submitted",
				session.mode,
				session.tx_hash,
			);

			if maybe_submitted {
				self.hold_unresolved(session.tx_hash);
			}
		}

		self.state = ClaimState::Idle;
	}

	fn hold_unresolved(&mut self, tx_hash: Option<H256>) {
		self.unresolved = Some(Unresolved {
			tx_hash,
			until: Instant::now() + self.config.finalization_timeout(),
		});
	}

	/// Release the guard once the unwatched extrinsic reaches a final state.
	fn resolve_unresolved(&mut self, event: &TransactionEvent) {
		let terminal = matches!(
			event,
			TransactionEvent::Finalized { .. } | TransactionEvent::Error { .. }
		);

		if terminal &&
			self.unresolved
				.map_or(false, |u| u.tx_hash == Some(event.tx_hash()))
		{
			log::info!(
				target: LOG_TARGET,
				"Unwatched extrinsic {:?} resolved",
				event.tx_hash(),
			);
			self.unresolved = None;
		}
	}

	/// Drive the pending submission with `events` until it resolves or the
	/// finalization timeout elapses.
	pub async fn watch<S>(&mut self, mut events: S) -> Result<ClaimOutcome, ClaimError>
	where
		S: Stream<Item = TransactionEvent> + Unpin,
	{
		let tx_hash = match self.session.as_ref().and_then(|session| session.tx_hash) {
			Some(tx_hash) => tx_hash,
			None => {
				return match &self.state {
					ClaimState::Finalized(outcome) => Ok(outcome.clone()),
					ClaimState::Failed(error) => Err(error.clone()),
					_ => Err(ClaimError::NoActiveSubmission),
				}
			}
		};

		let deadline = Instant::now() + self.config.finalization_timeout();

		loop {
			match tokio::time::timeout_at(deadline, events.next()).await {
				Ok(Some(event)) => {
					if let Some(result) = self.on_event(event) {
						return result;
					}
				}
				Ok(None) => {
					log::warn!(
						target: LOG_TARGET,
						"Event stream of {:?} ended before finalization",
						tx_hash,
					);
					return Err(self.on_timeout(tx_hash).unwrap_or(ClaimError::Timeout));
				}
				Err(_) => return Err(self.on_timeout(tx_hash).unwrap_or(ClaimError::Timeout)),
			}
		}
	}

	/// Chain estimate of what `remote` has unlocked by `now`, `None` while
	/// vesting has not started or the account has no reward.
	pub async fn estimate_unlocked(
		&self,
		remote: &RemoteAccount,
		now: Moment,
	) -> Result<Option<Balance>, ClaimError> {
		let allocation = match self.api.reward(remote).await.map_err(query_failed)? {
			Some(allocation) => allocation,
			None => return Ok(None),
		};
		let initial_payment = self.api.initial_payment().await.map_err(query_failed)?;
		let schedule = self.api.vesting_schedule().await.map_err(query_failed)?;

		Ok(unlocked_at(&allocation, initial_payment, &schedule, now))
	}

	fn notify_processing(&mut self) {
		let session = match self.session.as_mut() {
			Some(session) if !session.processing_notified => session,
			_ => return,
		};
		session.processing_notified = true;

		if let Some(tx_hash) = session.tx_hash {
			self.notifier.notify(Notification::Processing {
				mode: session.mode,
				tx_hash,
				explorer_url: self.config.explorer_link(&tx_hash),
			});
		}
	}

	fn complete(
		&mut self,
		session: ClaimSession,
		delta: Balance,
		resolution: Resolution,
	) -> ClaimOutcome {
		match (resolution, session.association()) {
			(Resolution::Applied, Some(association)) => {
				self.cache.confirm_association(association);
				self.notifier.notify(Notification::EligibilityChanged);
			}
			(Resolution::AlreadyAssociated, _) => self.cache.mark_eligibility_stale(),
			_ => {}
		}
		self.cache.fold(&session.remote, delta);

		let outcome = ClaimOutcome {
			mode: session.mode,
			remote: session.remote,
			tx_hash: session.tx_hash,
			delta,
			resolution,
		};

		log::info!(
			target: LOG_TARGET,
			"{:?} finalized with delta {} ({:?})",
			outcome.mode,
			outcome.delta,
			outcome.resolution,
		);

		self.notifier.notify(Notification::Finalized {
			mode: outcome.mode,
			tx_hash: outcome.tx_hash,
			delta,
			explorer_url: outcome
				.tx_hash
				.and_then(|tx_hash| self.config.explorer_link(&tx_hash)),
		});

		self.state = ClaimState::Finalized(outcome.clone());
		self.session = None;

		outcome
	}

	fn fail(&mut self, error: ClaimError) -> ClaimError {
		log::warn!(target: LOG_TARGET, "Claim session failed: {}", error);

		self.session = None;
		self.notifier.notify(Notification::Failed {
			message: error.to_string(),
		});
		self.state = ClaimState::Failed(error.clone());

		error
	}
}
