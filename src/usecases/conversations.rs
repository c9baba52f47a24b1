use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult, unexpected};
use crate::models::conversations::{Conversation, ConversationView};
use crate::repositories::conversations;
use crate::usecases::{listings, users};
use hashbrown::HashMap;
use tracing::warn;

pub async fn fetch_one<C: Context>(ctx: &C, conversation_id: u64) -> ServiceResult<Conversation> {
    match conversations::fetch_one(ctx, conversation_id).await {
        Ok(conversation) => Ok(Conversation::from(conversation)),
        Err(sqlx::Error::RowNotFound) => Err(AppError::ConversationsNotFound),
        Err(e) => unexpected(e),
    }
}

/// Returns the existing conversation for the (buyer, seller, listing)
/// triple or inserts a new one. The check and the insert are two separate
/// statements with no uniqueness constraint behind them; concurrent calls
/// for the same triple can create duplicates.
pub async fn get_or_create<C: Context>(
    ctx: &C,
    buyer_id: i64,
    seller_id: i64,
    listing_id: Option<i64>,
) -> ServiceResult<Conversation> {
    if buyer_id == seller_id {
        return Err(AppError::ConversationsSelfConversation);
    }
    users::fetch_one(ctx, buyer_id).await?;
    users::fetch_one(ctx, seller_id).await?;
    if let Some(listing_id) = listing_id {
        listings::fetch_one(ctx, listing_id).await?;
    }

    match conversations::fetch_by_triple(ctx, buyer_id, seller_id, listing_id).await {
        Ok(Some(existing)) => Ok(Conversation::from(existing)),
        Ok(None) => match conversations::create(ctx, buyer_id, seller_id, listing_id).await {
            Ok(created) => Ok(Conversation::from(created)),
            Err(e) => unexpected(e),
        },
        Err(e) => unexpected(e),
    }
}

/// All conversations the user participates in, newest activity first,
/// enriched with both participant profiles and the listing summary. The
/// profiles are fetched in one batched query, the listings in another.
pub async fn fetch_for_user<C: Context>(
    ctx: &C,
    user_id: i64,
) -> ServiceResult<Vec<ConversationView>> {
    let conversations = match conversations::fetch_for_user(ctx, user_id).await {
        Ok(conversations) => conversations,
        Err(e) => return unexpected(e),
    };

    let mut participant_ids = Vec::with_capacity(conversations.len() * 2);
    let mut listing_ids = vec![];
    for conversation in &conversations {
        participant_ids.push(conversation.buyer_id);
        participant_ids.push(conversation.seller_id);
        if let Some(listing_id) = conversation.listing_id {
            listing_ids.push(listing_id);
        }
    }
    participant_ids.sort_unstable();
    participant_ids.dedup();
    listing_ids.sort_unstable();
    listing_ids.dedup();

    let profiles: HashMap<i64, _> = users::fetch_many(ctx, &participant_ids)
        .await?
        .into_iter()
        .map(|profile| (profile.user_id, profile))
        .collect();
    let listings: HashMap<i64, _> = listings::fetch_many(ctx, &listing_ids)
        .await?
        .into_iter()
        .map(|listing| (listing.listing_id, listing))
        .collect();

    let mut views = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let buyer = profiles.get(&conversation.buyer_id);
        let seller = profiles.get(&conversation.seller_id);
        let (buyer, seller) = match (buyer, seller) {
            (Some(buyer), Some(seller)) => (buyer.clone(), seller.clone()),
            _ => {
                warn!(
                    conversation_id = conversation.id,
                    "Skipping conversation with missing participant profile"
                );
                continue;
            }
        };
        let listing = conversation
            .listing_id
            .and_then(|listing_id| listings.get(&listing_id).cloned());
        views.push(ConversationView {
            conversation: Conversation::from(conversation),
            buyer,
            seller,
            listing,
        });
    }
    Ok(views)
}
