use std::cell::{Cell, Ref, RefCell};

use crate::cookies::CookieJar;
use crate::history::History;
use crate::identity::IdentityStore;
use crate::profile::{Profile, ProfileClient};
use crate::{LandingError, Result};

const ROOT_PATH: &str = "/";

/// Which of the two page views is active.
#[derive(Eq, PartialEq, Clone, Debug)]
pub enum ViewState {
    AwaitingInput,
    Resolved(Profile),
}

impl ViewState {
    pub fn profile(&self) -> Option<&Profile> {
        match self {
            ViewState::AwaitingInput => None,
            ViewState::Resolved(profile) => Some(profile),
        }
    }
}

/// What became of a form submission.
#[derive(Debug)]
pub enum SubmitOutcome {
    Resolved(Profile),
    /// Blank after trimming; nothing was sent.
    EmptyName,
    /// Another profile request is still pending.
    Busy,
    /// The form is not shown in this state.
    AlreadyResolved,
    Failed(LandingError),
}

/// Marks a profile request as pending for as long as it lives.
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Decides, once per page load, whether the visitor is known, and moves
/// them to the dashboard after they sign up.
///
/// All methods take `&self`: the page runs on one thread and the only
/// suspension points are the profile requests, during which no borrow of
/// the inner cells is held.
pub struct SessionResolver<J, C, H> {
    store: RefCell<IdentityStore<J>>,
    client: C,
    history: RefCell<H>,
    state: RefCell<ViewState>,
    in_flight: Cell<bool>,
}

impl<J, C, H> SessionResolver<J, C, H>
where
    J: CookieJar,
    C: ProfileClient,
    H: History,
{
    pub fn new(store: IdentityStore<J>, client: C, history: H) -> Self {
        Self {
            store: RefCell::new(store),
            client,
            history: RefCell::new(history),
            state: RefCell::new(ViewState::AwaitingInput),
            in_flight: Cell::new(false),
        }
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn history(&self) -> Ref<'_, H> {
        self.history.borrow()
    }

    pub fn store(&self) -> Ref<'_, IdentityStore<J>> {
        self.store.borrow()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.get()
    }

    /// Resolve the identity carried by the current location or cookies.
    ///
    /// Never fails: a missing user or a broken backend both land on the
    /// onboarding form.
    pub async fn resolve_initial(&self) -> ViewState {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            log::trace!("initial resolution already running");
            return self.state();
        };

        let path = self.history.borrow().pathname().to_owned();
        let candidate = self.store.borrow().candidate(&path);
        let Some(identity) = candidate else {
            log::debug!("no identity in {:?} or cookies", path);
            return self.enter_awaiting();
        };

        match self.client.fetch_profile(&identity).await {
            Ok(Some(profile)) => match self.enter_resolved(profile) {
                Ok(profile) => ViewState::Resolved(profile),
                Err(e) => {
                    log::error!("profile for {} is unusable: {}", identity, e);
                    self.enter_awaiting()
                }
            },
            Ok(None) => {
                log::debug!("no profile for {}", identity);
                self.enter_awaiting()
            }
            Err(e) => {
                log::error!("failed to fetch profile {}: {}", identity, e);
                self.enter_awaiting()
            }
        }
    }

    /// Create a profile for the name typed into the onboarding form.
    pub async fn submit(&self, visible_name: &str) -> SubmitOutcome {
        if matches!(*self.state.borrow(), ViewState::Resolved(_)) {
            return SubmitOutcome::AlreadyResolved;
        }
        let visible_name = visible_name.trim();
        if visible_name.is_empty() {
            log::trace!("ignoring blank display name");
            return SubmitOutcome::EmptyName;
        }
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            log::trace!("profile request pending, ignoring submission");
            return SubmitOutcome::Busy;
        };

        let created = self.client.create_profile(visible_name).await;
        match created.and_then(|profile| self.enter_resolved(profile)) {
            Ok(profile) => SubmitOutcome::Resolved(profile),
            Err(e) => {
                log::error!("failed to create profile: {}", e);
                SubmitOutcome::Failed(e)
            }
        }
    }

    fn enter_resolved(&self, profile: Profile) -> Result<Profile> {
        let identity = profile.identity().ok_or(LandingError::Parse)?;
        // The backend's id and name win over whatever the visitor came with.
        if let Err(e) = self.store.borrow_mut().write(&identity) {
            log::error!("failed to persist identity {}: {}", identity, e);
        }
        self.history.borrow_mut().replace(&identity.canonical_path());
        log::debug!("resolved {}", identity);

        *self.state.borrow_mut() = ViewState::Resolved(profile.clone());
        Ok(profile)
    }

    fn enter_awaiting(&self) -> ViewState {
        self.history.borrow_mut().replace(ROOT_PATH);
        log::debug!("awaiting input");
        *self.state.borrow_mut() = ViewState::AwaitingInput;
        ViewState::AwaitingInput
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::MemoryJar;
    use crate::history::MemoryHistory;
    use crate::identity::Identity;
    use crate::{NAME_COOKIE, USER_ID_COOKIE};
    use async_trait::async_trait;

    #[derive(Clone)]
    enum Reply {
        Found(Profile),
        Missing,
        Fail,
    }

    struct ScriptedClient {
        fetch: Reply,
        create: Reply,
        fetched: RefCell<Vec<Identity>>,
        created: RefCell<Vec<String>>,
    }

    impl ScriptedClient {
        fn new(fetch: Reply, create: Reply) -> Self {
            Self {
                fetch,
                create,
                fetched: RefCell::new(vec![]),
                created: RefCell::new(vec![]),
            }
        }
    }

    fn server_error() -> LandingError {
        LandingError::ServerError {
            status: 500,
            url: "https://api.test/user".to_owned(),
        }
    }

    #[async_trait(?Send)]
    impl ProfileClient for ScriptedClient {
        async fn fetch_profile(
            &self,
            identity: &Identity,
        ) -> Result<Option<Profile>> {
            self.fetched.borrow_mut().push(identity.clone());
            match &self.fetch {
                Reply::Found(profile) => Ok(Some(profile.clone())),
                Reply::Missing => Ok(None),
                Reply::Fail => Err(server_error()),
            }
        }

        async fn create_profile(&self, visible_name: &str) -> Result<Profile> {
            self.created.borrow_mut().push(visible_name.to_owned());
            tokio::task::yield_now().await;
            match &self.create {
                Reply::Found(profile) => Ok(profile.clone()),
                Reply::Missing | Reply::Fail => Err(server_error()),
            }
        }
    }

    fn profile(id: &str, name: &str, visible: &str) -> Profile {
        Profile {
            id: id.to_owned(),
            name: name.to_owned(),
            visible_name: visible.to_owned(),
        }
    }

    fn resolver(
        cookies: &str,
        path: &str,
        client: ScriptedClient,
    ) -> SessionResolver<MemoryJar, ScriptedClient, MemoryHistory> {
        SessionResolver::new(
            IdentityStore::new(MemoryJar::from_header(cookies)),
            client,
            MemoryHistory::new(path),
        )
    }

    #[tokio::test]
    async fn anonymous_visitor_awaits_input() {
        let resolver =
            resolver("", "/", ScriptedClient::new(Reply::Missing, Reply::Fail));

        assert_eq!(resolver.resolve_initial().await, ViewState::AwaitingInput);
        assert!(resolver.client().fetched.borrow().is_empty());
        assert_eq!(resolver.history().pathname(), "/");
        assert!(resolver.store().jar().is_empty());
    }

    #[tokio::test]
    async fn path_identity_resolves_and_persists() {
        let alice = profile("42", "alice", "Alice");
        let resolver = resolver(
            "",
            "/42-alice",
            ScriptedClient::new(Reply::Found(alice.clone()), Reply::Fail),
        );

        assert_eq!(
            resolver.resolve_initial().await,
            ViewState::Resolved(alice)
        );
        assert_eq!(
            *resolver.client().fetched.borrow(),
            vec![Identity::new("42", "alice").unwrap()]
        );
        let store = resolver.store();
        assert_eq!(store.jar().get(USER_ID_COOKIE).as_deref(), Some("42"));
        assert_eq!(store.jar().get(NAME_COOKIE).as_deref(), Some("alice"));
        assert_eq!(resolver.history().pathname(), "/42-alice");
        assert_eq!(resolver.history().len(), 1);
    }

    #[tokio::test]
    async fn backend_canonical_identity_wins() {
        let canonical = profile("42", "alice-2", "Alice");
        let resolver = resolver(
            "UserID=1; Name=stale",
            "/42-alice",
            ScriptedClient::new(Reply::Found(canonical), Reply::Fail),
        );

        resolver.resolve_initial().await;
        assert_eq!(
            resolver.store().read_from_persistence(),
            Identity::new("42", "alice-2")
        );
        assert_eq!(resolver.history().pathname(), "/42-alice-2");
    }

    #[tokio::test]
    async fn unknown_user_writes_no_cookies() {
        let resolver = resolver(
            "",
            "/42-alice",
            ScriptedClient::new(Reply::Missing, Reply::Fail),
        );

        assert_eq!(resolver.resolve_initial().await, ViewState::AwaitingInput);
        assert_eq!(resolver.client().fetched.borrow().len(), 1);
        assert!(resolver.store().jar().is_empty());
        assert_eq!(resolver.history().pathname(), "/");
    }

    #[tokio::test]
    async fn cookie_identity_is_used_without_path() {
        let bob = profile("7", "bob", "Bob");
        let resolver = resolver(
            "UserID=7; Name=bob",
            "/",
            ScriptedClient::new(Reply::Found(bob.clone()), Reply::Fail),
        );

        assert_eq!(resolver.resolve_initial().await, ViewState::Resolved(bob));
        assert_eq!(
            *resolver.client().fetched.borrow(),
            vec![Identity::new("7", "bob").unwrap()]
        );
        assert_eq!(resolver.history().pathname(), "/7-bob");
    }

    #[tokio::test]
    async fn server_error_falls_back_to_form() {
        let resolver = resolver(
            "UserID=7; Name=bob",
            "/",
            ScriptedClient::new(Reply::Fail, Reply::Fail),
        );

        assert_eq!(resolver.resolve_initial().await, ViewState::AwaitingInput);
        assert_eq!(resolver.history().pathname(), "/");
        assert!(!resolver.is_busy());
    }

    #[tokio::test]
    async fn profile_without_identity_falls_back_to_form() {
        let resolver = resolver(
            "",
            "/42-alice",
            ScriptedClient::new(Reply::Found(profile("", "", "?")), Reply::Fail),
        );

        assert_eq!(resolver.resolve_initial().await, ViewState::AwaitingInput);
        assert!(resolver.store().jar().is_empty());
    }

    #[tokio::test]
    async fn submit_creates_profile_once() {
        let bob = profile("7", "bob", "Bob");
        let resolver = resolver(
            "",
            "/",
            ScriptedClient::new(Reply::Missing, Reply::Found(bob.clone())),
        );
        resolver.resolve_initial().await;

        let outcome = resolver.submit("  Bob ").await;
        assert!(matches!(outcome, SubmitOutcome::Resolved(ref p) if *p == bob));
        assert_eq!(*resolver.client().created.borrow(), vec!["Bob"]);
        assert_eq!(resolver.state(), ViewState::Resolved(bob));
        assert_eq!(
            resolver.store().read_from_persistence(),
            Identity::new("7", "bob")
        );
        assert_eq!(resolver.history().pathname(), "/7-bob");

        let again = resolver.submit("Bob").await;
        assert!(matches!(again, SubmitOutcome::AlreadyResolved));
        assert_eq!(resolver.client().created.borrow().len(), 1);
    }

    #[tokio::test]
    async fn blank_name_is_ignored() {
        let resolver =
            resolver("", "/", ScriptedClient::new(Reply::Missing, Reply::Fail));

        for name in ["", "   ", "\t\n"] {
            assert!(matches!(
                resolver.submit(name).await,
                SubmitOutcome::EmptyName
            ));
        }
        assert!(resolver.client().created.borrow().is_empty());
        assert_eq!(resolver.state(), ViewState::AwaitingInput);
    }

    #[tokio::test]
    async fn failed_creation_stays_on_form() {
        let resolver =
            resolver("", "/", ScriptedClient::new(Reply::Missing, Reply::Fail));
        resolver.resolve_initial().await;

        let outcome = resolver.submit("Bob").await;
        assert!(
            matches!(outcome, SubmitOutcome::Failed(ref e) if e.is_server_error())
        );
        assert_eq!(resolver.state(), ViewState::AwaitingInput);
        assert!(resolver.store().jar().is_empty());
        assert!(!resolver.is_busy());
    }

    #[tokio::test]
    async fn concurrent_submissions_issue_one_request() {
        let bob = profile("7", "bob", "Bob");
        let resolver = resolver(
            "",
            "/",
            ScriptedClient::new(Reply::Missing, Reply::Found(bob)),
        );

        let (first, second) =
            tokio::join!(resolver.submit("Bob"), resolver.submit("Bob"));
        assert!(matches!(first, SubmitOutcome::Resolved(_)));
        assert!(matches!(second, SubmitOutcome::Busy));
        assert_eq!(resolver.client().created.borrow().len(), 1);
    }
}
