use std::fmt;

use crate::links::{ActionLink, LinkRegistry};
use crate::platform::Platform;
use crate::profile::Endpoints;
use crate::session::ViewState;

/// The two mutually exclusive page sections.
#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum Container {
    Onboarding,
    Dashboard,
}

#[derive(Eq, PartialEq, Hash, Clone, Debug)]
pub enum Control {
    NameInput,
    NameButton,
    OpenAppButton,
    AppLink(String),
}

#[derive(Eq, PartialEq, Hash, Clone, Copy, Debug)]
pub enum Trigger {
    Click,
    EnterKey,
}

/// What activating a bound control does.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Action {
    Submit,
    /// Full page navigation.
    Navigate(String),
    OpenInNewContext(String),
}

#[derive(Eq, PartialEq, Clone, Copy, Debug)]
pub enum TextSlot {
    VisibleName,
}

/// Non-blocking message shown to the visitor.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum Notice {
    CreateFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CreateFailed => {
                f.write_str("Could not create your profile, please try again")
            }
        }
    }
}

/// One install button, ready to be put on the page.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct RenderedLink {
    pub id: String,
    pub label: String,
    pub action: Action,
}

pub fn render_link(link: &ActionLink) -> RenderedLink {
    RenderedLink {
        id: link.id.clone(),
        label: link.label.clone(),
        action: Action::OpenInNewContext(link.url.clone()),
    }
}

/// Whatever displays the page: the DOM in a browser, [`crate::Page`] in
/// tests and on the command line.
pub trait ViewSurface {
    fn set_visible(&mut self, container: Container, visible: bool);

    fn set_text(&mut self, slot: TextSlot, text: &str);

    /// Current content of the display name input.
    fn input_value(&self) -> String;

    /// Attach `action` to `control`, replacing what was bound to the same
    /// control and trigger before.
    fn bind(&mut self, control: Control, trigger: Trigger, action: Action);

    fn action_for(&self, control: &Control, trigger: Trigger)
        -> Option<Action>;

    /// Remove every rendered install button along with its binding.
    fn clear_links(&mut self);

    /// Append a button that runs `link.action` on click.
    fn append_link(&mut self, link: RenderedLink);

    fn notify(&mut self, notice: Notice);

    fn navigate(&mut self, url: &str);

    fn open_in_new_context(&mut self, url: &str);
}

pub struct ViewController {
    endpoints: Endpoints,
}

impl ViewController {
    pub fn new(endpoints: Endpoints) -> Self {
        Self { endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Show the section matching `state` and hide the other one.
    pub fn render<V: ViewSurface>(&self, surface: &mut V, state: &ViewState) {
        match state {
            ViewState::AwaitingInput => {
                surface.bind(Control::NameButton, Trigger::Click, Action::Submit);
                surface.bind(
                    Control::NameInput,
                    Trigger::EnterKey,
                    Action::Submit,
                );
                surface.set_visible(Container::Dashboard, false);
                surface.set_visible(Container::Onboarding, true);
            }
            ViewState::Resolved(profile) => {
                surface.set_text(TextSlot::VisibleName, &profile.visible_name);
                let deep_link = self.endpoints.deep_link(profile);
                surface.bind(
                    Control::OpenAppButton,
                    Trigger::Click,
                    Action::Navigate(deep_link),
                );
                surface.set_visible(Container::Onboarding, false);
                surface.set_visible(Container::Dashboard, true);
            }
        }
    }

    pub fn render_links<V: ViewSurface>(
        &self,
        surface: &mut V,
        links: &[ActionLink],
    ) {
        surface.clear_links();
        for link in links {
            surface.append_link(render_link(link));
        }
    }

    pub fn render_platform_links<V: ViewSurface>(
        &self,
        surface: &mut V,
        platform: Platform,
        registry: &LinkRegistry,
    ) {
        log::debug!("rendering links for {}", platform);
        self.render_links(surface, registry.links_for(platform));
    }
}
