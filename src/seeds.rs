use rand::seq::SliceRandom;

use crate::Config;

/// The full seed vocabulary. A run only ever touches a random sample of
/// `batch_size` of these, so over many runs coverage evens out.
pub const ALL_SEEDS: &[&str] = &[
    // Year / general
    "2026", "2025", "Best", "Top", "list", "example", "template", "sample", "guide",
    "format", "How to", "tutorial", "trends", "news", "review", "vs", "alternatives",
    // AI & tech
    "ai", "openai", "chatgpt", "gemini", "claude", "llama", "mistral", "hugging face",
    "assistant", "agent", "advisor", "copilot", "chatbot", "llm", "diffusion", "transformer",
    "generator", "creator", "maker", "builder", "designer", "developer", "coder",
    "android", "ios", "windows", "linux", "macos", "python", "javascript", "react", "nextjs",
    "compiler", "interpreter", "algorithm", "framework", "library", "api", "sdk",
    // Tools & utilities
    "upscale", "unblur", "editor", "enhancer", "optimizer", "converter", "compressor",
    "scraper", "crawler", "parser", "extractor", "summarizer", "transcriber", "translator",
    "paraphraser", "rewriter", "writer", "checker", "detector", "humanizer", "scanner",
    "tester", "evaluator", "analyzer", "calculator", "simulator", "emulator",
    "manager", "tracker", "scheduler", "planner", "calendar", "organizer", "syncer",
    "recorder", "player", "viewer", "reader", "browser", "notifier", "alert",
    // Assets & resources
    "resources", "dashboard", "directory", "portal", "hub", "finder", "search",
    "layout", "starter", "boilerplate", "ui kit", "component", "plugin", "extension",
    "theme", "icon", "logo", "font", "illustration", "vector", "mockup",
    // Creative & media
    "image", "photo", "picture", "face", "portrait", "avatar", "profile",
    "video", "movie", "film", "short", "clip", "reel",
    "audio", "voice", "sound", "music", "song", "beat", "podcast",
    "text", "code", "script", "prompt", "caption", "subtitle",
    "style", "filter", "effect", "preset", "lut", "palette",
    "chart", "graph", "diagram", "infographic", "map",
    "anime", "cartoon", "manga", "comic", "tattoo", "sketch", "drawing",
    "coloring page", "wallpaper", "background", "texture", "pattern",
    "meme", "emoji", "sticker", "gif",
    // Platforms & gaming
    "Steam", "Roblox", "Scratch", "Itch.io", "Discord", "Twitch", "TikTok",
    "Instagram", "YouTube", "Twitter", "Reddit", "Pinterest", "LinkedIn",
    "Github", "Gitlab", "Bitbucket", "Stack Overflow", "Kaggle",
    "Epic Games", "Nintendo", "PlayStation", "Xbox", "Unity", "Unreal Engine",
    "Godot", "Blender", "Figma", "Canva", "Adobe", "Microsoft", "Google", "Apple",
    // Finance & crypto
    "crypto", "bitcoin", "ethereum", "solana", "nft", "blockchain", "web3", "defi",
    "wallet", "exchange", "broker", "trading", "investment", "stock", "market",
    "insurance", "loan", "mortgage", "credit", "card", "bank", "tax", "wealth",
    "finance", "money", "gold", "silver", "forex", "refinance", "attorney", "lawyer",
    // Lifestyle & other
    "job", "career", "remote", "freelance", "salary", "interview", "resume",
    "travel", "flight", "hotel", "booking", "trip", "visa",
    "health", "fitness", "diet", "workout", "yoga", "meditation",
    "food", "recipe", "restaurant", "delivery",
    "shopping", "deal", "coupon", "discount", "sale", "price",
    "gift", "present", "toy", "game", "book", "course", "lesson",
];

/// Randomly samples `batch_size` seeds for this run (fewer if the vocabulary
/// is smaller than the batch).
pub fn sample_batch(config: &Config) -> Vec<String> {
    let mut rng = rand::thread_rng();
    ALL_SEEDS
        .choose_multiple(&mut rng, config.batch_size.min(ALL_SEEDS.len()))
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_respects_batch_size() {
        let config = Config {
            batch_size: 5,
            ..Config::default()
        };
        let batch = sample_batch(&config);
        assert_eq!(batch.len(), 5);
    }

    #[test]
    fn sample_is_capped_by_vocabulary_and_has_no_duplicates() {
        let config = Config {
            batch_size: usize::MAX,
            ..Config::default()
        };
        let batch = sample_batch(&config);
        assert_eq!(batch.len(), ALL_SEEDS.len());

        let mut sorted = batch.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), batch.len());
    }
}
