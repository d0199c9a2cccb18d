//! Auth command handlers: login, register, logout, whoami.

use anyhow::Result;
use beating_core::api::ApiClient;
use beating_core::auth::flow::AuthFlowCoordinator;
use beating_core::auth::pending::PendingAction;

pub async fn login(
    flow: &mut AuthFlowCoordinator,
    api_url: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let api = ApiClient::new(api_url);
    let outcome = api.login(email, password).await?;

    let identity = outcome.identity.clone();
    let resumed = flow.complete_login(&outcome.credential, outcome.identity)?;

    println!("✓ Logged in as {} (id {})", identity.handle, identity.id);
    report_resumed(resumed);
    Ok(())
}

pub async fn register(
    flow: &mut AuthFlowCoordinator,
    api_url: &str,
    username: &str,
    email: &str,
    password: &str,
) -> Result<()> {
    let api = ApiClient::new(api_url);
    let user_id = api.register(username, email, password).await?;
    println!("✓ Registered {username} (id {user_id})");

    // The original flow lands a fresh account logged in.
    let outcome = api.login(email, password).await?;
    let identity = outcome.identity.clone();
    let resumed = flow.complete_login(&outcome.credential, outcome.identity)?;

    println!("✓ Logged in as {} (id {})", identity.handle, identity.id);
    report_resumed(resumed);
    Ok(())
}

pub fn logout(flow: &mut AuthFlowCoordinator) -> Result<()> {
    if flow.logout()? {
        println!("✓ Logged out");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub fn whoami(flow: &AuthFlowCoordinator) -> Result<()> {
    let session = flow.session.current();
    match session.identity {
        Some(identity) => println!("Logged in as {} (id {})", identity.handle, identity.id),
        None => println!("Not logged in."),
    }
    Ok(())
}

fn report_resumed(resumed: Option<PendingAction>) {
    if let Some(action) = resumed {
        println!("Resuming where you left off: {}", action.destination);
        println!("  {}", action.payload);
    }
}
