//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use linkup_core::{
    ConversationService, FollowService, GroupService, PostService, ProfileHints, ProfileService,
    ReadStatusService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub profile_service: ProfileService,
    pub follow_service: FollowService,
    pub post_service: PostService,
    pub conversation_service: ConversationService,
    pub group_service: GroupService,
    pub read_status_service: ReadStatusService,
}

/// Header carrying the gateway-verified external identity.
pub const SUBJECT_HEADER: &str = "x-identity-subject";
/// Header carrying the handle hint for first sign-in provisioning.
pub const HANDLE_HEADER: &str = "x-identity-handle";
/// Header carrying the display-name hint.
pub const DISPLAY_NAME_HEADER: &str = "x-identity-display-name";
/// Header carrying the avatar hint.
pub const AVATAR_HEADER: &str = "x-identity-avatar";

fn header_str<'a>(req: &'a Request<Body>, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Identity middleware.
///
/// The identity provider sits in front of this service; by the time a
/// request arrives, its subject header is verified. The middleware resolves
/// the subject to a profile (provisioning one lazily when a handle hint is
/// present) and attaches it to the request. Unresolvable requests proceed
/// unauthenticated; guarded handlers reject them via the extractor.
pub async fn identity_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(subject) = header_str(&req, SUBJECT_HEADER).map(str::to_string) {
        let resolved = match state.profile_service.resolve(&subject).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(error = %e, "Identity resolution failed");
                None
            }
        };

        let profile = match resolved {
            Some(profile) => Some(profile),
            // First sign-in: provision from the identity hints.
            None => match header_str(&req, HANDLE_HEADER).map(str::to_string) {
                Some(handle) => {
                    let hints = ProfileHints {
                        handle,
                        display_name: header_str(&req, DISPLAY_NAME_HEADER).map(str::to_string),
                        avatar_url: header_str(&req, AVATAR_HEADER).map(str::to_string),
                    };
                    match state.profile_service.ensure(&subject, hints).await {
                        Ok(profile) => Some(profile),
                        Err(e) => {
                            tracing::warn!(error = %e, "Profile provisioning failed");
                            None
                        }
                    }
                }
                None => None,
            },
        };

        if let Some(profile) = profile {
            req.extensions_mut().insert(profile);
        }
    }

    next.run(req).await
}
