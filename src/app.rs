use crate::cookies::CookieJar;
use crate::history::History;
use crate::links::{LinkRegistry, REGISTRY};
use crate::platform::Platform;
use crate::profile::ProfileClient;
use crate::session::{SessionResolver, SubmitOutcome, ViewState};
use crate::view::{
    Action, Control, Notice, Trigger, ViewController, ViewSurface,
};

/// One page view: the resolver deciding who the visitor is and the
/// controller drawing the outcome onto a surface.
pub struct Landing<'r, J, C, H, V> {
    resolver: SessionResolver<J, C, H>,
    controller: ViewController,
    registry: &'r LinkRegistry,
    surface: V,
}

impl<J, C, H, V> Landing<'static, J, C, H, V>
where
    J: CookieJar,
    C: ProfileClient,
    H: History,
    V: ViewSurface,
{
    pub fn new(
        resolver: SessionResolver<J, C, H>,
        controller: ViewController,
        surface: V,
    ) -> Self {
        Self {
            resolver,
            controller,
            registry: &REGISTRY,
            surface,
        }
    }
}

impl<'r, J, C, H, V> Landing<'r, J, C, H, V>
where
    J: CookieJar,
    C: ProfileClient,
    H: History,
    V: ViewSurface,
{
    pub fn with_registry<'a>(
        self,
        registry: &'a LinkRegistry,
    ) -> Landing<'a, J, C, H, V> {
        Landing {
            resolver: self.resolver,
            controller: self.controller,
            registry,
            surface: self.surface,
        }
    }

    pub fn resolver(&self) -> &SessionResolver<J, C, H> {
        &self.resolver
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }

    /// Page load: install links for the visitor's platform, then resolve
    /// the identity and show the matching section.
    pub async fn load(&mut self, user_agent: &str) -> ViewState {
        let platform = Platform::detect(user_agent);
        self.controller.render_platform_links(
            &mut self.surface,
            platform,
            self.registry,
        );

        let state = self.resolver.resolve_initial().await;
        self.controller.render(&mut self.surface, &state);
        state
    }

    /// Run whatever is bound to `control`, as a click or key press on the
    /// page would.
    pub async fn activate(
        &mut self,
        control: &Control,
        trigger: Trigger,
    ) -> Option<SubmitOutcome> {
        let Some(action) = self.surface.action_for(control, trigger) else {
            log::trace!("nothing bound to {:?} on {:?}", control, trigger);
            return None;
        };
        self.dispatch(action).await
    }

    /// Execute an action. Returns the submission outcome for
    /// [`Action::Submit`].
    pub async fn dispatch(&mut self, action: Action) -> Option<SubmitOutcome> {
        match action {
            Action::Submit => {
                let name = self.surface.input_value();
                let outcome = self.resolver.submit(&name).await;
                match &outcome {
                    SubmitOutcome::Resolved(_) => {
                        let state = self.resolver.state();
                        self.controller.render(&mut self.surface, &state);
                    }
                    SubmitOutcome::Failed(_) => {
                        self.surface.notify(Notice::CreateFailed);
                        self.controller
                            .render(&mut self.surface, &ViewState::AwaitingInput);
                    }
                    SubmitOutcome::EmptyName
                    | SubmitOutcome::Busy
                    | SubmitOutcome::AlreadyResolved => {}
                }
                Some(outcome)
            }
            Action::Navigate(url) => {
                self.surface.navigate(&url);
                None
            }
            Action::OpenInNewContext(url) => {
                self.surface.open_in_new_context(&url);
                None
            }
        }
    }
}
