//! Profile route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use portal_core::{Email, SessionUser};

use crate::api::ProfileUpdate;
use crate::middleware::RequireAuth;
use crate::services::ProfileService;
use crate::services::profile::{PROFILE_LOAD_FAILED, PROFILE_UPDATE_FAILED};
use crate::session::SessionStorage;
use crate::state::AppState;
use crate::views::{HeaderView, ProfileView};

use super::page_message;

/// Profile edit form data. Blank fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Values shown in the edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormValues {
    pub name: String,
    pub email: String,
}

impl FormValues {
    /// What the user submitted, with blank fields falling back to `current`.
    fn submitted(form: &ProfileForm, current: Option<&SessionUser>) -> Self {
        let pick = |typed: &str, cached: Option<String>| {
            let typed = typed.trim();
            if typed.is_empty() {
                cached.unwrap_or_default()
            } else {
                typed.to_string()
            }
        };

        Self {
            name: pick(&form.name, current.map(|user| user.name.clone())),
            email: pick(&form.email, current.map(|user| user.email.to_string())),
        }
    }
}

impl From<&ProfileView> for FormValues {
    fn from(profile: &ProfileView) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub header: HeaderView,
    pub profile: Option<ProfileView>,
    pub form: Option<FormValues>,
    pub error: Option<String>,
    pub success: Option<String>,
}

impl ProfileTemplate {
    fn new(user: Option<&SessionUser>) -> Self {
        Self {
            header: HeaderView::signed_in(user),
            profile: None,
            form: None,
            error: None,
            success: None,
        }
    }

    fn show_profile(&mut self, profile: ProfileView) {
        self.form = Some(FormValues::from(&profile));
        self.profile = Some(profile);
    }
}

/// Display the signed-in user's profile.
pub async fn show(
    State(state): State<AppState>,
    storage: SessionStorage,
    RequireAuth { user }: RequireAuth,
) -> Response {
    let mut page = ProfileTemplate::new(user.as_ref());
    if user.is_none() {
        page.error = Some("User not found.".to_string());
        return page.into_response();
    }

    match ProfileService::new(state.api(), &storage).get_profile(None).await {
        Ok(profile) => page.show_profile(profile.into()),
        Err(err) => match page_message(err, PROFILE_LOAD_FAILED) {
            Ok(message) => page.error = Some(message),
            Err(response) => return response,
        },
    }

    page.into_response()
}

/// Handle the profile edit form.
///
/// On failure the form is shown again with what the user typed.
pub async fn update(
    State(state): State<AppState>,
    storage: SessionStorage,
    RequireAuth { user }: RequireAuth,
    Form(form): Form<ProfileForm>,
) -> Response {
    let mut page = ProfileTemplate::new(user.as_ref());
    page.form = Some(FormValues::submitted(&form, user.as_ref()));

    let update = match changes(&form, user.as_ref()) {
        Ok(update) => update,
        Err(message) => {
            page.error = Some(message.to_string());
            return page.into_response();
        }
    };

    match ProfileService::new(state.api(), &storage).update_profile(&update).await {
        Ok(profile) => {
            let updated = SessionUser::from(profile.clone());
            page.header = HeaderView::signed_in(Some(&updated));
            page.show_profile(profile.into());
            page.success = Some("Profile updated successfully.".to_string());
        }
        Err(err) => match page_message(err, PROFILE_UPDATE_FAILED) {
            Ok(message) => page.error = Some(message),
            Err(response) => return response,
        },
    }

    page.into_response()
}

/// Build the partial update: only fields that are filled in and differ from
/// the cached user are sent.
fn changes(form: &ProfileForm, current: Option<&SessionUser>) -> Result<ProfileUpdate, &'static str> {
    let name = form.name.trim();
    let name = (!name.is_empty() && current.is_none_or(|user| user.name != name)).then(|| name.to_string());

    let email = form.email.trim();
    let email = if email.is_empty() {
        None
    } else {
        let email = Email::parse(email).map_err(|_| "Please enter a valid email address.")?;
        current.is_none_or(|user| user.email != email).then_some(email)
    };

    Ok(ProfileUpdate { name, email })
}
