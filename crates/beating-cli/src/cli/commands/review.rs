//! The protected action: starting a song review.

use anyhow::Result;
use beating_core::auth::flow::{AuthFlowCoordinator, Gate};
use serde_json::json;

/// Route the review form lives at; supplied to the navigation layer.
const REVIEW_ROUTE: &str = "/resenas";

pub fn start(flow: &mut AuthFlowCoordinator, song: &str, artist: Option<&str>) -> Result<()> {
    let payload = json!({ "song": song, "artist": artist });

    match flow.gate(payload, REVIEW_ROUTE)? {
        Gate::Allowed(identity) => {
            println!("Opening review form at {REVIEW_ROUTE} for {}", identity.handle);
            println!("  song: {song}");
            if let Some(artist) = artist {
                println!("  artist: {artist}");
            }
        }
        Gate::LoginRequired => {
            println!("Log in to review this song.");
            println!("Your selection is saved and will resume after login.");
        }
    }
    Ok(())
}
