use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::platform::Platform;

#[derive(Eq, PartialEq, Clone, Debug, Deserialize, Serialize)]
pub struct ActionLink {
    pub id: String,
    pub label: String,
    pub url: String,
}

impl ActionLink {
    pub fn new(id: &str, label: &str, url: &str) -> Self {
        Self {
            id: id.to_owned(),
            label: label.to_owned(),
            url: url.to_owned(),
        }
    }
}

const APP_STORE_RU: &str =
    "https://apps.apple.com/ru/app/happ-proxy-utility-plus/id6744287213";
const APP_STORE_GLOBAL: &str =
    "https://apps.apple.com/us/app/happ-proxy-utility/id6504287215";
const GOOGLE_PLAY: &str =
    "https://play.google.com/store/apps/details?id=com.happproxy";
const WINDOWS_INSTALLER: &str = "https://github.com/Happ-proxy/happ-desktop/\
                                 releases/latest/download/setup-Happ.x86.exe";

lazy_static! {
    pub static ref REGISTRY: LinkRegistry = LinkRegistry::builtin();
}

/// Static mapping from a platform to the install links shown for it.
#[derive(Debug, Default)]
pub struct LinkRegistry {
    links: HashMap<Platform, Vec<ActionLink>>,
}

impl LinkRegistry {
    pub fn builtin() -> Self {
        let mut registry = LinkRegistry::default();
        registry.register(
            Platform::Ios,
            vec![
                ActionLink::new("appbtn-ios-ru", "App Store [RU]", APP_STORE_RU),
                ActionLink::new(
                    "appbtn-ios-global",
                    "App Store [Global]",
                    APP_STORE_GLOBAL,
                ),
            ],
        );
        registry.register(
            Platform::Android,
            vec![ActionLink::new("appbtn-android", "Google Play", GOOGLE_PLAY)],
        );
        registry.register(
            Platform::Mac,
            vec![
                ActionLink::new("appbtn-osx-ru", "App Store [RU]", APP_STORE_RU),
                ActionLink::new(
                    "appbtn-osx-global",
                    "App Store [Global]",
                    APP_STORE_GLOBAL,
                ),
            ],
        );
        registry.register(
            Platform::Windows,
            vec![ActionLink::new("appbtn-win", ".exe", WINDOWS_INSTALLER)],
        );
        registry
    }

    /// Register the links of a platform, replacing any previous list.
    ///
    /// Ids repeated within the list are dropped after their first
    /// occurrence since they key the rendered buttons.
    pub fn register(&mut self, platform: Platform, links: Vec<ActionLink>) {
        let mut unique: Vec<ActionLink> = Vec::with_capacity(links.len());
        for link in links {
            if unique.iter().any(|l| l.id == link.id) {
                log::warn!(
                    "duplicate link id {} for {}, skipping",
                    link.id,
                    platform
                );
                continue;
            }
            unique.push(link);
        }
        self.links.insert(platform, unique);
    }

    pub fn links_for(&self, platform: Platform) -> &[ActionLink] {
        self.links
            .get(&platform)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn windows_has_single_installer() {
        let links = REGISTRY.links_for(Platform::Windows);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].id, "appbtn-win");
        assert_eq!(links[0].label, ".exe");
        assert!(links[0].url.ends_with("setup-Happ.x86.exe"));
    }

    #[test]
    fn unknown_platform_has_no_links() {
        assert!(REGISTRY.links_for(Platform::Unknown).is_empty());
        assert!(LinkRegistry::default()
            .links_for(Platform::Ios)
            .is_empty());
    }

    #[rstest]
    #[case(Platform::Ios, &["appbtn-ios-ru", "appbtn-ios-global"])]
    #[case(Platform::Android, &["appbtn-android"])]
    #[case(Platform::Mac, &["appbtn-osx-ru", "appbtn-osx-global"])]
    #[case(Platform::Windows, &["appbtn-win"])]
    fn ids_are_ordered_and_stable(
        #[case] platform: Platform,
        #[case] ids: &[&str],
    ) {
        let first: Vec<&str> = REGISTRY
            .links_for(platform)
            .iter()
            .map(|l| l.id.as_str())
            .collect();
        assert_eq!(first, ids);
        assert_eq!(REGISTRY.links_for(platform), REGISTRY.links_for(platform));
    }

    #[test]
    fn register_drops_duplicate_ids() {
        let mut registry = LinkRegistry::default();
        registry.register(
            Platform::Mac,
            vec![
                ActionLink::new("a", "first", "https://one.example/"),
                ActionLink::new("a", "second", "https://two.example/"),
                ActionLink::new("b", "third", "https://three.example/"),
            ],
        );
        let links = registry.links_for(Platform::Mac);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].label, "first");
        assert_eq!(links[1].id, "b");
    }
}
