use std::collections::HashMap;
use std::fmt;

use crate::view::{
    Action, Container, Control, Notice, RenderedLink, TextSlot, Trigger,
    ViewSurface,
};

/// In-memory page. Both sections start hidden, like the markup before the
/// bootstrap has run.
#[derive(Debug, Default)]
pub struct Page {
    onboarding: bool,
    dashboard: bool,
    visible_name: String,
    input: String,
    bindings: HashMap<(Control, Trigger), Action>,
    links: Vec<RenderedLink>,
    notices: Vec<Notice>,
    navigations: Vec<String>,
    opened: Vec<String>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the content of the display name input.
    pub fn type_name(&mut self, text: &str) {
        self.input = text.to_owned();
    }

    pub fn is_visible(&self, container: Container) -> bool {
        match container {
            Container::Onboarding => self.onboarding,
            Container::Dashboard => self.dashboard,
        }
    }

    pub fn visible_name(&self) -> &str {
        &self.visible_name
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn links(&self) -> &[RenderedLink] {
        &self.links
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn navigations(&self) -> &[String] {
        &self.navigations
    }

    pub fn opened(&self) -> &[String] {
        &self.opened
    }
}

impl ViewSurface for Page {
    fn set_visible(&mut self, container: Container, visible: bool) {
        match container {
            Container::Onboarding => self.onboarding = visible,
            Container::Dashboard => self.dashboard = visible,
        }
    }

    fn set_text(&mut self, slot: TextSlot, text: &str) {
        match slot {
            TextSlot::VisibleName => self.visible_name = text.to_owned(),
        }
    }

    fn input_value(&self) -> String {
        self.input.clone()
    }

    fn bind(&mut self, control: Control, trigger: Trigger, action: Action) {
        self.bindings.insert((control, trigger), action);
    }

    fn action_for(
        &self,
        control: &Control,
        trigger: Trigger,
    ) -> Option<Action> {
        self.bindings.get(&(control.clone(), trigger)).cloned()
    }

    fn clear_links(&mut self) {
        self.links.clear();
        self.bindings
            .retain(|(control, _), _| !matches!(control, Control::AppLink(_)));
    }

    fn append_link(&mut self, link: RenderedLink) {
        self.bind(
            Control::AppLink(link.id.clone()),
            Trigger::Click,
            link.action.clone(),
        );
        self.links.push(link);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_owned());
    }

    fn open_in_new_context(&mut self, url: &str) {
        self.opened.push(url.to_owned());
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.onboarding {
            writeln!(f, "[onboarding] enter a display name to continue")?;
        }
        if self.dashboard {
            writeln!(f, "[dashboard] {}", self.visible_name)?;
            if let Some(Action::Navigate(url)) =
                self.action_for(&Control::OpenAppButton, Trigger::Click)
            {
                writeln!(f, "  open app: {}", url)?;
            }
        }
        for link in &self.links {
            if let Action::OpenInNewContext(url) = &link.action {
                writeln!(f, "  {} ({}): {}", link.label, link.id, url)?;
            }
        }
        for notice in &self.notices {
            writeln!(f, "! {}", notice)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_blank() {
        let page = Page::new();
        assert!(!page.is_visible(Container::Onboarding));
        assert!(!page.is_visible(Container::Dashboard));
        assert_eq!(page.to_string(), "");
    }

    #[test]
    fn clear_links_keeps_other_bindings() {
        let mut page = Page::new();
        page.bind(Control::NameButton, Trigger::Click, Action::Submit);
        page.append_link(RenderedLink {
            id: "a".to_owned(),
            label: "A".to_owned(),
            action: Action::OpenInNewContext("https://a.test/".to_owned()),
        });
        assert_eq!(page.binding_count(), 2);

        page.clear_links();
        assert_eq!(page.binding_count(), 1);
        assert!(page.links().is_empty());
    }

    #[test]
    fn displays_dashboard() {
        let mut page = Page::new();
        page.set_visible(Container::Dashboard, true);
        page.set_text(TextSlot::VisibleName, "Alice");
        page.bind(
            Control::OpenAppButton,
            Trigger::Click,
            Action::Navigate("happ://add/x".to_owned()),
        );
        page.notify(Notice::CreateFailed);

        let text = page.to_string();
        assert!(text.starts_with("[dashboard] Alice\n  open app: happ://add/x\n"));
        assert!(text.ends_with("! Could not create your profile, please try again\n"));
    }
}
