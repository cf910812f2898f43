//! Async orchestration of gateway-backed session actions.
//!
//! Every action follows the same three phases: take a ticket under the session
//! lock, call the gateway with no lock held, then apply the outcome under the
//! lock again. A completion the session no longer expects is logged and
//! dropped; the caller still receives the current snapshot. While the gateway
//! call is outstanding a release guard is armed, so a request dropped mid-call
//! (client disconnect, timeout layer) still clears its loading flag.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::gateway::AiGateway;
use crate::models::{SearchParams, UserProfile};
use crate::session::machine::SearchTicket;
use crate::session::snapshot::SessionSnapshot;
use crate::session::store::SessionStore;

async fn run_search(
    store: &SessionStore,
    gateway: &dyn AiGateway,
    id: Uuid,
    ticket: SearchTicket,
) -> Result<SessionSnapshot, AppError> {
    info!(
        "Searching '{}' in '{}' (page {}) for session {id}",
        ticket.params.role, ticket.params.location, ticket.page
    );

    let guard = store.release_on_drop(id, {
        let ticket = ticket.clone();
        move |s| {
            s.fail_search(&ticket);
        }
    });
    let outcome = gateway
        .search_jobs(&ticket.params.role, &ticket.params.location, ticket.page)
        .await;
    guard.disarm();

    match outcome {
        Ok(result) => {
            let count = result.jobs.len();
            store
                .update(id, |s| {
                    if s.complete_search(&ticket, result) {
                        info!("Session {id}: {count} jobs on page {}", ticket.page);
                    } else {
                        debug!("Session {id}: dropping stale search response");
                    }
                    Ok(s.snapshot())
                })
                .await
        }
        Err(e) => {
            warn!("Job search failed for session {id}: {e}");
            // The session may have been deleted meanwhile; the gateway error wins.
            let _ = store
                .update(id, |s| {
                    s.fail_search(&ticket);
                    Ok(())
                })
                .await;
            Err(e.into())
        }
    }
}

/// SEARCH → RESULTS on success; page resets to 1.
pub async fn submit_search(
    store: &SessionStore,
    gateway: &dyn AiGateway,
    id: Uuid,
    params: SearchParams,
) -> Result<SessionSnapshot, AppError> {
    let ticket = store.update(id, |s| s.begin_search(params)).await?;
    run_search(store, gateway, id, ticket).await
}

/// Re-runs the current search for `page`. Pages below 1 return the snapshot unchanged.
pub async fn change_page(
    store: &SessionStore,
    gateway: &dyn AiGateway,
    id: Uuid,
    page: i64,
) -> Result<SessionSnapshot, AppError> {
    match store.update(id, |s| s.begin_page_change(page)).await? {
        Some(ticket) => run_search(store, gateway, id, ticket).await,
        None => store.read(id, |s| Ok(s.snapshot())).await,
    }
}

/// Fills the profile form from the selected job (or generically). Never fails
/// on a gateway error: the placeholder profile is applied instead.
pub async fn autofill_profile(
    store: &SessionStore,
    gateway: &dyn AiGateway,
    id: Uuid,
) -> Result<SessionSnapshot, AppError> {
    let ticket = store.update(id, |s| s.begin_autofill()).await?;

    let guard = store.release_on_drop(id, {
        let ticket = ticket.clone();
        move |s| {
            s.fail_autofill(&ticket);
        }
    });
    let outcome = gateway.generate_profile(ticket.job.as_ref()).await;
    guard.disarm();

    let profile = match outcome {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Profile generation failed for session {id}, using placeholder: {e}");
            UserProfile::fallback()
        }
    };

    store
        .update(id, |s| {
            if !s.complete_autofill(&ticket, profile) {
                debug!("Session {id}: dropping stale profile response");
            }
            Ok(s.snapshot())
        })
        .await
}

/// PROFILE_INPUT → RESUME_EDITOR on success.
pub async fn generate_resume(
    store: &SessionStore,
    gateway: &dyn AiGateway,
    id: Uuid,
) -> Result<SessionSnapshot, AppError> {
    let ticket = store.update(id, |s| s.begin_generation()).await?;
    info!(
        "Generating résumé for session {id} (target job: {})",
        ticket.job.as_ref().map(|j| j.id.as_str()).unwrap_or("none")
    );

    let guard = store.release_on_drop(id, {
        let ticket = ticket.clone();
        move |s| {
            s.fail_generation(&ticket);
        }
    });
    let outcome = gateway
        .generate_resume_structure(ticket.job.as_ref(), &ticket.profile)
        .await;
    guard.disarm();

    match outcome {
        Ok(data) => {
            store
                .update(id, |s| {
                    if !s.complete_generation(&ticket, data) {
                        debug!("Session {id}: dropping stale résumé response");
                    }
                    Ok(s.snapshot())
                })
                .await
        }
        Err(e) => {
            warn!("Résumé generation failed for session {id}: {e}");
            let _ = store
                .update(id, |s| {
                    s.fail_generation(&ticket);
                    Ok(())
                })
                .await;
            Err(e.into())
        }
    }
}

/// Replaces the editor text with the model's rewrite.
pub async fn rewrite_resume(
    store: &SessionStore,
    gateway: &dyn AiGateway,
    id: Uuid,
    instruction: &str,
) -> Result<SessionSnapshot, AppError> {
    let ticket = store.update(id, |s| s.begin_rewrite(instruction)).await?;

    let guard = store.release_on_drop(id, {
        let ticket = ticket.clone();
        move |s| {
            s.fail_rewrite(&ticket);
        }
    });
    let outcome = gateway
        .rewrite_text(&ticket.content, &ticket.instruction)
        .await;
    guard.disarm();

    match outcome {
        Ok(text) => {
            store
                .update(id, |s| {
                    if !s.complete_rewrite(&ticket, text) {
                        debug!("Session {id}: dropping stale rewrite response");
                    }
                    Ok(s.snapshot())
                })
                .await
        }
        Err(e) => {
            warn!("Rewrite failed for session {id}: {e}");
            let _ = store
                .update(id, |s| {
                    s.fail_rewrite(&ticket);
                    Ok(())
                })
                .await;
            Err(e.into())
        }
    }
}
