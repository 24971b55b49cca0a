//! Example captions for a first session.

use captionkit_core::captions::CaptionStore;
use captionkit_core::CoreResult;

/// Start time and text of each example caption
const EXAMPLE_CAPTIONS: [(f64, &str); 3] = [
    (2.481795, "[A sunny day in the afternoon]"),
    (13.726788, "[A water spring flowing through the grass]"),
    (17.301098, "[A bird is whispering]"),
];

/// Video the example captions were written for
pub const EXAMPLE_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Adds the example captions to `store`
pub fn seed_examples(store: &mut CaptionStore) -> CoreResult<()> {
    for (start, text) in EXAMPLE_CAPTIONS {
        let id = store.add(start)?.id;
        store.set_text(&id, text)?;
    }
    Ok(())
}
