use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use haven_core::profile::ProfileUpdate;
use haven_core::validation::{
    FieldErrors, PasswordPolicy, validate_age, validate_email, validate_malaysian_location,
    validate_malaysian_phone, validate_name, validate_password,
};
use haven_infrastructure::ConfigService;

use super::context::AppContext;
use super::validate::report;

#[derive(Subcommand)]
pub enum AccountCommand {
    /// Create an account
    SignUp(SignUpArgs),
    /// Sign in with email and password
    SignIn {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out and clear locally cached user data
    SignOut,
    /// Show the signed-in user and profile
    Whoami,
    /// Update profile fields
    Profile(ProfileArgs),
    /// Mark onboarding as completed
    Onboard,
    /// Refresh the access token
    Refresh,
}

#[derive(Args)]
pub struct SignUpArgs {
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    #[command(flatten)]
    profile: ProfileArgs,
}

#[derive(Args)]
pub struct ProfileArgs {
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    age: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    phone: Option<String>,
}

impl ProfileArgs {
    fn check(&self, errors: FieldErrors) -> FieldErrors {
        errors
            .check(
                "fullName",
                self.full_name
                    .as_deref()
                    .and_then(|v| validate_name(v, "Full name")),
            )
            .check("age", self.age.as_deref().and_then(validate_age))
            .check(
                "location",
                self.location.as_deref().and_then(validate_malaysian_location),
            )
            .check(
                "phone",
                self.phone.as_deref().and_then(validate_malaysian_phone),
            )
    }

    /// Builds the update from already validated input.
    fn into_update(self) -> ProfileUpdate {
        let mut update = ProfileUpdate::new();
        update.full_name = self.full_name.map(|v| v.trim().to_string());
        update.age = self.age.and_then(|v| v.trim().parse().ok());
        update.location = self.location;
        update.phone = self.phone;
        update
    }
}

pub async fn run(command: AccountCommand, config_service: &ConfigService) -> Result<()> {
    // Reject bad input before touching the network.
    match &command {
        AccountCommand::SignUp(args) => {
            let errors = FieldErrors::new()
                .check("email", validate_email(&args.email))
                .check(
                    "password",
                    validate_password(&args.password, &PasswordPolicy::default()),
                );
            report_invalid(&args.profile.check(errors))?;
        }
        AccountCommand::SignIn { email, .. } => {
            report_invalid(&FieldErrors::new().check("email", validate_email(email)))?;
        }
        AccountCommand::Profile(args) => {
            report_invalid(&args.check(FieldErrors::new()))?;
        }
        _ => {}
    }

    let ctx = AppContext::connect(config_service).await?;

    match command {
        AccountCommand::SignUp(args) => {
            let outcome = ctx
                .session
                .sign_up(&args.email, &args.password, args.profile.into_update())
                .await?;
            if outcome.confirmation_pending() {
                println!("Check your email to confirm your account, then sign in.");
            } else {
                let snapshot = ctx.wait_for_session().await?;
                print_json(&snapshot.profile)?;
            }
        }
        AccountCommand::SignIn { email, password } => {
            ctx.session.sign_in(&email, &password).await?;
            let snapshot = ctx.wait_for_session().await?;
            let name = snapshot
                .profile
                .as_ref()
                .map(|p| p.display_name(&email).to_string())
                .unwrap_or(email);
            println!("Signed in as {}", name);
        }
        AccountCommand::SignOut => {
            if let Err(e) = ctx.session.sign_out().await {
                // Local state is already cleared.
                tracing::warn!("Remote sign-out failed: {}", e);
            }
            println!("Signed out");
        }
        AccountCommand::Whoami => {
            let snapshot = ctx.require_session()?;
            if let Some(user) = snapshot.user() {
                println!("{} ({})", user.email, user.id);
            }
            print_json(&snapshot.profile)?;
        }
        AccountCommand::Profile(args) => {
            ctx.require_session()?;
            let update = args.into_update();
            if update.is_empty() {
                bail!("Nothing to update");
            }
            let profile = ctx.session.update_profile(update).await?;
            print_json(&profile)?;
        }
        AccountCommand::Onboard => {
            ctx.require_session()?;
            ctx.session.complete_onboarding().await?;
            println!("Onboarding completed");
        }
        AccountCommand::Refresh => {
            ctx.require_session()?;
            ctx.session.refresh_session().await?;
            println!("Session refreshed");
        }
    }

    ctx.session.shutdown();
    Ok(())
}

fn report_invalid(errors: &FieldErrors) -> Result<()> {
    if errors.is_valid() {
        return Ok(());
    }
    report(errors)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
