//! Progress bar utilities for image processing.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a progress bar for classifying multiple images.
///
/// Returns `None` when disabled or when there is only one image.
pub fn create_image_progress(total_images: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled || total_images <= 1 {
        return None;
    }

    let pb = ProgressBar::new(total_images as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} images ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░ "),
    );
    Some(pb)
}

/// Finish a progress bar with a message.
pub fn finish_progress(pb: Option<ProgressBar>, message: &str) {
    if let Some(pb) = pb {
        pb.finish_with_message(message.to_string());
    }
}

/// Increment a progress bar, showing the image just handled.
pub fn inc_progress(pb: Option<&ProgressBar>, current: &str) {
    if let Some(pb) = pb {
        pb.set_message(current.to_string());
        pb.inc(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_disabled() {
        assert!(create_image_progress(10, false).is_none());
        assert!(create_image_progress(1, true).is_none());
    }

    #[test]
    fn test_progress_counts() {
        let pb = create_image_progress(3, true);
        inc_progress(pb.as_ref(), "a.jpg");
        assert_eq!(pb.as_ref().map(ProgressBar::position), Some(1));
        finish_progress(pb, "done");
    }
}
