//! Basic example demonstrating the Favro API client.
//!
//! Run with:
//! ```
//! FAVRO_USER_EMAIL=me@example.com FAVRO_TOKEN=your-token cargo run --example basic
//! ```

use favroapi::{Collection, FavroClient, List, Organization};

#[tokio::main]
async fn main() -> favroapi::Result<()> {
    // Initialize tracing for debugging (optional)
    tracing_subscriber::fmt::init();

    // Create client from environment variables
    println!("Creating Favro client...");
    let mut client = FavroClient::from_env()?;
    println!("Connected to: {} as {}", client.base_url(), client.user_email());

    // Organizations can be listed without an organization scope
    println!("\n--- Organizations ---");
    let mut organizations = Organization::list(&client, &())?;
    for org in organizations.all_entities().await? {
        println!("  - {} ({})", org.name, org.id());
    }

    if client.organization_id().is_none() {
        let first = organizations
            .fetched_entities()?
            .first()
            .map(|org| org.id().to_string());
        client.set_organization(first);
    }

    // Walk the first collection down to its cards, one page at a time
    println!("\n--- Collections ---");
    let mut collections = Collection::list(&client, &Default::default())?;
    let Some(collection) = collections.fetch_next_page().await?.and_then(|page| page.first().cloned()) else {
        println!("No collections found");
        return Ok(());
    };
    println!("Collection: {}", collection.name);

    let mut widgets = collection.widgets()?;
    for widget in widgets.all_entities().await? {
        println!("\n  Widget: {} ({})", widget.name, widget.id());

        let mut cards = widget.cards()?;
        while let Some(page) = cards.fetch_next_page().await? {
            for card in page {
                println!("    - #{} {}", card.sequential_id.unwrap_or_default(), card.name);
            }
        }
    }

    let session = client.session();
    println!(
        "\nRequests remaining: {:?} (resets at {})",
        session.requests_remaining, session.limit_resets_at
    );

    Ok(())
}
