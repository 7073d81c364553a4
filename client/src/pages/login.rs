//! Login and signup page.
//!
//! DESIGN
//! ======
//! The form controller (`LoginForm`, `Submission`, `submit`) is plain Rust
//! so validation, toast wording, and state sequencing are testable without
//! a browser. The page holds the form signal outside the `RouteGate` so typed
//! input survives the loading placeholder shown while a call is in flight.
//! Navigation after success is left to the gate: once `AuthState` carries a
//! user, the login route redirects to the `next` return path.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use std::future::Future;
use std::time::Duration;

use leptos::prelude::*;

use crate::components::route_gate::RouteGate;
use crate::net::types::{SignupFields, User};
use crate::state::auth::{AuthFailure, AuthService, AuthState};
use crate::state::notifications::{NotificationKind, NotificationStore};
use crate::util::route_guard::LOGIN_ROUTE;

/// Shortest time the loading state stays visible after a submit.
pub const MIN_LOADING: Duration = Duration::from_millis(500);
/// Signup password floor.
pub const MIN_PASSWORD_LEN: usize = 6;

const PROGRESS_TOAST: Duration = Duration::from_millis(2000);
const VALIDATION_TOAST: Duration = Duration::from_millis(4000);

// =============================================================================
// FORM CONTROLLER
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Login,
    Signup,
}

impl FormMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Signup,
            Self::Signup => Self::Login,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Signup => "Sign Up",
        }
    }

    #[must_use]
    pub fn submit_label(self, busy: bool) -> &'static str {
        match (self, busy) {
            (Self::Login, false) => "Login",
            (Self::Login, true) => "Signing in...",
            (Self::Signup, false) => "Sign Up",
            (Self::Signup, true) => "Creating account...",
        }
    }

    #[must_use]
    pub fn toggle_prompt(self) -> &'static str {
        match self {
            Self::Login => "Don't have an account? Sign up",
            Self::Signup => "Already have an account? Log in",
        }
    }

    fn progress_message(self) -> &'static str {
        match self {
            Self::Login => "Signing in...",
            Self::Signup => "Creating your account...",
        }
    }

    fn success_toast(self) -> (&'static str, Duration) {
        match self {
            Self::Login => ("Welcome back! Successfully logged in.", Duration::from_millis(3000)),
            Self::Signup => ("Account created successfully! Welcome!", Duration::from_millis(4000)),
        }
    }

    fn failure_prefix(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Signup => "Account creation failed",
        }
    }
}

/// Raw form input, exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub mode: FormMode,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub username: String,
}

impl LoginForm {
    /// Clear every field, keeping the mode.
    pub fn reset(&mut self) {
        *self = Self { mode: self.mode, ..Self::default() };
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.reset();
    }

    /// Validate and normalize the input into a call to make.
    ///
    /// # Errors
    ///
    /// Returns the warning to show when the input is incomplete or invalid.
    pub fn submission(&self) -> Result<Submission, &'static str> {
        let email = self.email.trim();
        if email.is_empty() || self.password.is_empty() {
            return Err("Enter your email and password.");
        }
        match self.mode {
            FormMode::Login => Ok(Submission::Login {
                email: email.to_owned(),
                password: self.password.clone(),
            }),
            FormMode::Signup => {
                if self.password != self.confirm_password {
                    return Err("Passwords do not match");
                }
                if self.password.chars().count() < MIN_PASSWORD_LEN {
                    return Err("Password must be at least 6 characters");
                }
                let username = self.username.trim();
                Ok(Submission::Signup(SignupFields {
                    email: email.to_owned(),
                    password: self.password.clone(),
                    username: (!username.is_empty()).then(|| username.to_owned()),
                }))
            }
        }
    }
}

/// A validated auth call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Login { email: String, password: String },
    Signup(SignupFields),
}

impl Submission {
    #[must_use]
    pub fn mode(&self) -> FormMode {
        match self {
            Self::Login { .. } => FormMode::Login,
            Self::Signup(_) => FormMode::Signup,
        }
    }
}

/// Run a validated submission, bracketing it with toasts and auth state.
///
/// `floor` bounds how quickly the loading state may clear; the call and the
/// floor run concurrently and the state settles when both are done.
///
/// # Errors
///
/// Returns the service's `AuthFailure` after posting it as an error toast.
pub async fn submit<A, F, S>(
    service: &A,
    submission: Submission,
    current: AuthState,
    toasts: &NotificationStore,
    floor: F,
    set_state: S,
) -> Result<User, AuthFailure>
where
    A: AuthService,
    F: Future<Output = ()>,
    S: Fn(AuthState),
{
    let mode = submission.mode();
    toasts.announce(mode.progress_message(), NotificationKind::Info, Some(PROGRESS_TOAST));
    set_state(current.authenticating());

    let call = async {
        match &submission {
            Submission::Login { email, password } => service.login(email, password).await,
            Submission::Signup(fields) => service.signup(fields).await,
        }
    };
    let (result, ()) = futures::join!(call, floor);

    match &result {
        Ok(user) => {
            set_state(AuthState::signed_in(user.clone()));
            let (message, lifetime) = mode.success_toast();
            toasts.announce(message, NotificationKind::Success, Some(lifetime));
        }
        Err(e) => {
            set_state(AuthState { user: current.user, is_authenticating: false });
            toasts.announce(format!("{}: {e}", mode.failure_prefix()), NotificationKind::Error, None);
        }
    }
    result
}

// =============================================================================
// VIEW
// =============================================================================

#[component]
pub fn LoginPage() -> impl IntoView {
    let form = RwSignal::new(LoginForm::default());
    view! {
        <RouteGate path=LOGIN_ROUTE>
            <LoginCard form/>
        </RouteGate>
    }
}

#[component]
fn LoginCard(form: RwSignal<LoginForm>) -> impl IntoView {
    let auth = expect_context::<RwSignal<AuthState>>();
    let toasts = expect_context::<NotificationStore>();
    let busy = Memo::new(move |_| auth.get().is_authenticating);
    let mode = Memo::new(move |_| form.get().mode);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let submission = match form.get_untracked().submission() {
            Ok(submission) => submission,
            Err(warning) => {
                toasts.announce(warning, NotificationKind::Warning, Some(VALIDATION_TOAST));
                return;
            }
        };

        #[cfg(feature = "hydrate")]
        {
            let toasts = toasts.clone();
            leptos::task::spawn_local(async move {
                let floor = gloo_timers::future::sleep(MIN_LOADING);
                let current = auth.get_untracked();
                let service = crate::net::api::HttpAuthService;
                match submit(&service, submission, current, &toasts, floor, |s| auth.set(s)).await {
                    Ok(_) => form.update(LoginForm::reset),
                    Err(e) => log::warn!("auth call rejected: {e}"),
                }
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = submission;
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>{move || mode.get().title()}</h1>
                <form class="login-form" on:submit=on_submit>
                    <Show when=move || mode.get() == FormMode::Signup>
                        <input
                            class="login-input"
                            type="text"
                            placeholder="Username (optional)"
                            prop:value=move || form.read().username.clone()
                            on:input=move |ev| form.update(|f| f.username = event_target_value(&ev))
                        />
                    </Show>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        required
                        prop:value=move || form.read().email.clone()
                        on:input=move |ev| form.update(|f| f.email = event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        required
                        prop:value=move || form.read().password.clone()
                        on:input=move |ev| form.update(|f| f.password = event_target_value(&ev))
                    />
                    <Show when=move || mode.get() == FormMode::Signup>
                        <input
                            class="login-input"
                            type="password"
                            placeholder="Confirm password"
                            required
                            prop:value=move || form.read().confirm_password.clone()
                            on:input=move |ev| {
                                form.update(|f| f.confirm_password = event_target_value(&ev));
                            }
                        />
                    </Show>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || mode.get().submit_label(busy.get())}
                    </button>
                </form>
                <button
                    class="login-toggle"
                    type="button"
                    disabled=move || busy.get()
                    on:click=move |_| form.update(LoginForm::toggle_mode)
                >
                    {move || mode.get().toggle_prompt()}
                </button>
            </div>
        </div>
    }
}
