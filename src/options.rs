/// Startup configuration, fixed for the lifetime of the application.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppOptions {
    /// Hides window chrome and skips validation.
    pub kiosk: bool,
    pub model: Option<String>,
    pub preset: String,
    pub camera_position: Option<[f32; 3]>,
}

impl AppOptions {
    /// Reads a location fragment such as `#model=scene.gltf&kiosk=1`.
    pub fn from_fragment(fragment: &str) -> Self {
        let query = fragment.strip_prefix('#').unwrap_or(fragment);
        let mut options = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "kiosk" => options.kiosk = !value.is_empty(),
                "model" if !value.is_empty() => options.model = Some(value.into_owned()),
                "preset" => options.preset = value.into_owned(),
                "cameraPosition" => options.camera_position = parse_camera_position(&value),
                _ => log::debug!("Ignoring unknown option: {key}"),
            }
        }

        options
    }
}

/// Parses `x,y,z`. Anything other than three finite numbers is ignored.
pub fn parse_camera_position(value: &str) -> Option<[f32; 3]> {
    let components: Result<Vec<f32>, _> = value
        .split(',')
        .map(|component| component.trim().parse::<f32>())
        .collect();

    match components.as_deref() {
        Ok(&[x, y, z]) if [x, y, z].iter().all(|component| component.is_finite()) => Some([x, y, z]),
        _ => {
            log::warn!("Ignoring invalid camera position: {value}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fragment_gives_defaults() {
        assert_eq!(AppOptions::from_fragment(""), AppOptions::default());
        assert_eq!(AppOptions::from_fragment("#"), AppOptions::default());
    }

    #[test]
    fn all_recognised_keys() {
        let options = AppOptions::from_fragment(
            "#kiosk=1&model=https%3A%2F%2Fexample.com%2FDuck.gltf&preset=assetgenerator&cameraPosition=1,2.5,-3",
        );

        assert!(options.kiosk);
        assert_eq!(options.model.as_deref(), Some("https://example.com/Duck.gltf"));
        assert_eq!(options.preset, "assetgenerator");
        assert_eq!(options.camera_position, Some([1.0, 2.5, -3.0]));
    }

    #[test]
    fn kiosk_needs_a_value() {
        assert!(!AppOptions::from_fragment("#kiosk").kiosk);
        assert!(!AppOptions::from_fragment("#kiosk=").kiosk);
        assert!(AppOptions::from_fragment("#kiosk=true").kiosk);
    }

    #[test]
    fn malformed_camera_positions_are_dropped() {
        assert_eq!(parse_camera_position("1,2"), None);
        assert_eq!(parse_camera_position("1,2,3,4"), None);
        assert_eq!(parse_camera_position("1,a,3"), None);
        assert_eq!(parse_camera_position("1,NaN,3"), None);
        assert_eq!(parse_camera_position(" 0, 0 ,10"), Some([0.0, 0.0, 10.0]));
    }
}
