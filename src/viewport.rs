//! Device-class viewport presets.
//!
//! A fixed table mapping device-class names to the viewport dimensions and
//! pixel density passed to the remote capture service. Unknown classes fall
//! back to the desktop profile rather than failing.

/// Viewport dimensions and pixel density for a device class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportProfile {
    pub width: u32,
    pub height: u32,
    pub device_scale_factor: f64,
}

/// Known device classes, in the order they appear in the UI.
pub const DEVICE_CLASSES: &[&str] = &["desktop", "laptop", "tablet", "mobile"];

const DESKTOP: ViewportProfile = ViewportProfile {
    width: 1920,
    height: 1080,
    device_scale_factor: 1.0,
};

const LAPTOP: ViewportProfile = ViewportProfile {
    width: 1366,
    height: 768,
    device_scale_factor: 1.0,
};

const TABLET: ViewportProfile = ViewportProfile {
    width: 768,
    height: 1024,
    device_scale_factor: 2.0,
};

const MOBILE: ViewportProfile = ViewportProfile {
    width: 375,
    height: 667,
    device_scale_factor: 2.0,
};

/// Resolve a device class to its viewport profile.
///
/// Unknown device classes resolve to the desktop profile.
#[must_use]
pub fn profile_for(device_class: &str) -> ViewportProfile {
    match device_class {
        "laptop" => LAPTOP,
        "tablet" => TABLET,
        "mobile" => MOBILE,
        _ => DESKTOP,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_profiles() {
        assert_eq!(profile_for("desktop").width, 1920);
        assert_eq!(profile_for("laptop").width, 1366);
        assert_eq!(profile_for("tablet").height, 1024);

        let mobile = profile_for("mobile");
        assert_eq!((mobile.width, mobile.height), (375, 667));
        assert_eq!(mobile.device_scale_factor, 2.0);
    }

    #[test]
    fn test_unknown_class_falls_back_to_desktop() {
        assert_eq!(profile_for("fridge"), profile_for("desktop"));
        assert_eq!(profile_for(""), profile_for("desktop"));
    }
}
