//! List posts from the content API

use anyhow::Result;

use crate::listing::Listing;
use crate::Blog;

/// Print every listed post, following the pagination cursor to the end
pub async fn run(blog: &Blog) -> Result<()> {
    let listing = Listing::load_pages(
        blog.source.as_ref(),
        &blog.listing_options(),
        &blog.dates,
        usize::MAX,
    )
    .await?;

    println!("Posts ({}):", listing.posts().len());
    for post in listing.posts() {
        println!(
            "  {} - {} [{}]",
            post.first_publication_date.as_deref().unwrap_or("-"),
            post.data.title,
            post.uid.as_deref().unwrap_or("no uid")
        );
    }

    Ok(())
}
