//! Post, comment and author mappers

use market_core::{Author, Comment, Post, ReactionCount, ReactionSymbol, ReactionTally};
use tracing::debug;

use crate::models::{AuthorModel, CommentModel, PostModel, ReactionCountModel};

impl From<AuthorModel> for Author {
    fn from(model: AuthorModel) -> Self {
        Self {
            id: model.id,
            display_name: model.display_name,
            avatar_url: model.avatar_url.filter(|url| !url.is_empty()),
        }
    }
}

impl From<CommentModel> for Comment {
    fn from(model: CommentModel) -> Self {
        Self {
            id: model.id,
            post_id: model.post_id,
            author: model.author.into(),
            content: model.content,
            created_at: model.created_at,
            likes_count: model.likes_count,
            is_liked: model.is_liked,
        }
    }
}

fn parse_symbol(raw: &str) -> Option<ReactionSymbol> {
    match ReactionSymbol::parse(raw) {
        Ok(symbol) => Some(symbol),
        Err(_) => {
            debug!(reaction = raw, "Dropping unsupported reaction");
            None
        }
    }
}

fn tally_from(models: Vec<ReactionCountModel>) -> ReactionTally {
    ReactionTally::from_counts(models.into_iter().filter_map(|m| {
        parse_symbol(&m.reaction).map(|symbol| ReactionCount::new(symbol, m.count))
    }))
}

impl From<PostModel> for Post {
    fn from(model: PostModel) -> Self {
        let mut reactions = tally_from(model.reactions);
        let my_reaction = model.my_reaction.as_deref().and_then(parse_symbol);

        // the user's own pick must be backed by the tally
        if let Some(symbol) = my_reaction {
            if reactions.count_of(symbol) == 0 {
                reactions.increment(symbol);
            }
        }

        Self {
            id: model.id,
            author: model.author.into(),
            kind: model.kind,
            content: model.content,
            created_at: model.created_at,
            likes_count: model.likes_count,
            is_liked: model.is_liked,
            my_reaction,
            reactions,
            comments: model.comments.into_iter().map(Comment::from).collect(),
        }
    }
}
