//! Testimonial carousels: a quote slider and an image slider that drive each
//! other.

use serde_json::{json, Value};

/// One slider bound to a container selector.
#[derive(Debug, Clone, PartialEq)]
pub struct Slider {
    pub selector: String,
    pub options: Value,
}

/// Two sliders linked through each other's controller.
///
/// Both containers must be on the page; otherwise neither is created.
#[derive(Debug, Clone, PartialEq)]
pub struct SwiperPair {
    pub quotes: Slider,
    pub images: Slider,
}

impl SwiperPair {
    /// The testimonials section pair.
    pub fn testimonials() -> Self {
        Self {
            quotes: Slider {
                selector: ".swiper-containe1".to_string(),
                options: json!({ "effect": "fade" }),
            },
            images: Slider {
                selector: ".swiper-containe2".to_string(),
                options: json!({
                    "spaceBetween": 20,
                    "navigation": {
                        "nextEl": ".swiper-button-next-testimonials",
                        "prevEl": ".swiper-button-prev-testimonials",
                    },
                }),
            },
        }
    }

    /// Whether the sliders should be created, given which selectors are present
    /// and whether the slider library loaded.
    pub fn should_mount(&self, present: impl Fn(&str) -> bool, library_loaded: bool) -> bool {
        library_loaded && present(&self.quotes.selector) && present(&self.images.selector)
    }

    /// Configuration for the host binding: both sliders and their controller
    /// links.
    pub fn to_config(&self) -> Value {
        json!({
            "sliders": [
                { "selector": self.quotes.selector, "options": self.quotes.options },
                { "selector": self.images.selector, "options": self.images.options },
            ],
            "controls": [
                [self.quotes.selector, self.images.selector],
                [self.images.selector, self.quotes.selector],
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn testimonials_config_links_both_sliders() {
        let config = SwiperPair::testimonials().to_config();

        assert_eq!(config["sliders"][0]["options"]["effect"], "fade");
        assert_eq!(config["sliders"][1]["options"]["spaceBetween"], 20);
        assert_eq!(
            config["sliders"][1]["options"]["navigation"]["nextEl"],
            ".swiper-button-next-testimonials"
        );
        assert_eq!(
            config["controls"],
            json!([
                [".swiper-containe1", ".swiper-containe2"],
                [".swiper-containe2", ".swiper-containe1"],
            ])
        );
    }

    #[test]
    fn mounts_only_with_both_containers_and_library() {
        let pair = SwiperPair::testimonials();

        assert!(pair.should_mount(|_| true, true));
        assert!(!pair.should_mount(|_| true, false));
        assert!(!pair.should_mount(|s| s == ".swiper-containe1", true));
    }
}
