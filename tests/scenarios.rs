//! End-to-end runs of the gallery machines on a paused tokio clock.

mod common;

use common::{fixture, fixture_with, init_tracing, settle};
use harvest::effects::{HttpResponse, StubHttpClient};
use harvest::gallery::counter::{CounterInput, CounterState};
use harvest::gallery::debug_root::{self, DebugRootConfig, DebugRootInput, DebugRootState};
use harvest::gallery::github::{GitHubConfig, GitHubInput, GitHubState, Owner, Repository};
use harvest::gallery::image_loader::ImageLoaderInput;
use harvest::gallery::root::{self, Current, RootEffectId, RootInput, RootState};
use harvest::gallery::state_diagram::{StateDiagramInput, StateDiagramState};
use harvest::gallery::stopwatch::{StopwatchInput, StopwatchState};
use harvest::gallery::{CommonEffectQueue, World};
use harvest::harvester::Harvester;
use harvest::time_travel::TimeTravelInput;
use std::time::Duration;

type RootHarvester = Harvester<RootInput, RootState, CommonEffectQueue, RootEffectId, World>;

const SEARCH_URL: &str = "https://api.test/search/repositories";
const AVATAR_URL: &str = "https://avatars.test/ferris.png";

fn root_on(current: Current, world: World) -> RootHarvester {
    let config = GitHubConfig {
        endpoint: SEARCH_URL.to_string(),
        ..GitHubConfig::default()
    };
    let initial = RootState {
        current: Some(current),
    };
    Harvester::new(initial, root::mapping(config), world).unwrap()
}

fn github_state(machine: &RootHarvester) -> GitHubState {
    match machine.state().current {
        Some(Current::GitHub(state)) => state,
        other => panic!("expected the GitHub screen, got {other:?}"),
    }
}

fn repository(id: u64) -> Repository {
    Repository {
        id,
        full_name: format!("ferris/crab-{id}"),
        description: None,
        stargazers_count: id * 10,
        html_url: format!("https://github.test/ferris/crab-{id}"),
        owner: Owner {
            id: 1,
            login: "ferris".to_string(),
            avatar_url: AVATAR_URL.to_string(),
        },
    }
}

#[tokio::test]
async fn counter_increments_through_root() {
    init_tracing();
    let machine = root_on(Current::Counter(CounterState::default()), fixture().world);

    machine.send(RootInput::Counter(CounterInput::Increment));

    assert_eq!(
        machine.state().current,
        Some(Current::Counter(CounterState { count: 1 }))
    );
}

#[tokio::test(start_paused = true)]
async fn login_completes_after_round_trip() {
    init_tracing();
    let machine = root_on(Current::StateDiagram(StateDiagramState::LoggedOut), fixture().world);

    machine.send(RootInput::StateDiagram(StateDiagramInput::Login));
    assert_eq!(
        machine.state().current,
        Some(Current::StateDiagram(StateDiagramState::LoggingIn))
    );

    settle(Duration::from_millis(500)).await;
    assert_eq!(
        machine.state().current,
        Some(Current::StateDiagram(StateDiagramState::LoggingIn))
    );

    settle(Duration::from_millis(600)).await;
    assert_eq!(
        machine.state().current,
        Some(Current::StateDiagram(StateDiagramState::LoggedIn))
    );

    machine.send(RootInput::StateDiagram(StateDiagramInput::Login));
    assert_eq!(
        machine.state().current,
        Some(Current::StateDiagram(StateDiagramState::LoggedIn))
    );
    assert_eq!(machine.running_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn leaving_the_stopwatch_stops_its_timer() {
    init_tracing();
    let fixture = fixture();
    let machine = root_on(Current::Stopwatch(StopwatchState::default()), fixture.world.clone());

    machine.send(RootInput::Stopwatch(StopwatchInput::Start));
    settle(Duration::from_millis(35)).await;

    match machine.state().current {
        Some(Current::Stopwatch(state)) => assert!(state.status.is_running()),
        other => panic!("expected the stopwatch screen, got {other:?}"),
    }
    assert!(fixture.clock.reads() >= 3);

    machine.send(RootInput::ChangeCurrent(Some(Current::Intro)));
    let reads = fixture.clock.reads();

    settle(Duration::from_millis(100)).await;
    assert_eq!(fixture.clock.reads(), reads);
    assert_eq!(machine.running_effects(), 0);
    assert_eq!(machine.state().current, Some(Current::Intro));
}

#[tokio::test(start_paused = true)]
async fn shared_avatar_is_downloaded_once() {
    init_tracing();
    let fixture = fixture();
    fixture.http.respond(AVATAR_URL, HttpResponse::ok(b"png".to_vec()));
    let machine = root_on(Current::GitHub(GitHubState::default()), fixture.world.clone());

    machine.send(RootInput::GitHub(GitHubInput::UpdateItems(vec![
        repository(1),
        repository(2),
    ])));
    settle(Duration::from_millis(10)).await;

    let state = github_state(&machine);
    assert_eq!(state.items().len(), 2);
    assert_eq!(state.image_loader.images.get(AVATAR_URL), Some(&b"png".to_vec()));
    assert!(!state.image_loader.is_requesting(AVATAR_URL));

    machine.send(RootInput::GitHub(GitHubInput::ImageLoader(
        ImageLoaderInput::RequestImage {
            url: AVATAR_URL.to_string(),
        },
    )));
    settle(Duration::from_millis(10)).await;

    assert_eq!(fixture.http.call_count(AVATAR_URL), 1);
}

#[tokio::test(start_paused = true)]
async fn typing_quickly_sends_only_the_last_search() {
    init_tracing();
    let fixture = fixture();
    fixture.http.respond(SEARCH_URL, HttpResponse::ok(br#"{"items": []}"#.to_vec()));
    let machine = root_on(Current::GitHub(GitHubState::default()), fixture.world.clone());

    for text in ["r", "ru", "rust"] {
        machine.send(RootInput::GitHub(GitHubInput::UpdateSearchText(text.to_string())));
        settle(Duration::from_millis(100)).await;
    }
    assert!(github_state(&machine).is_loading());
    assert!(fixture.http.calls().is_empty());

    settle(Duration::from_millis(300)).await;

    let calls = fixture.http.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, vec![("q".to_string(), "rust".to_string())]);

    let state = github_state(&machine);
    assert!(!state.is_loading());
    assert!(state.items().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancelled_download_never_reports_back() {
    init_tracing();
    let fixture = fixture_with(StubHttpClient::new().with_latency(Duration::from_millis(50)));
    fixture.http.respond(AVATAR_URL, HttpResponse::ok(b"png".to_vec()));
    let machine = root_on(Current::GitHub(GitHubState::default()), fixture.world.clone());

    let loader = |input| RootInput::GitHub(GitHubInput::ImageLoader(input));
    machine.send(loader(ImageLoaderInput::RequestImage {
        url: AVATAR_URL.to_string(),
    }));
    settle(Duration::from_millis(10)).await;
    assert_eq!(fixture.http.call_count(AVATAR_URL), 1);
    assert!(github_state(&machine).image_loader.is_requesting(AVATAR_URL));

    machine.send(loader(ImageLoaderInput::CancelRequest {
        url: AVATAR_URL.to_string(),
    }));
    settle(Duration::from_millis(100)).await;

    let state = github_state(&machine);
    assert!(state.image_loader.images.is_empty());
    assert!(!state.image_loader.is_requesting(AVATAR_URL));
    assert_eq!(machine.running_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn avatar_downloads_respect_the_concurrency_cap() {
    init_tracing();
    let fixture = fixture_with(StubHttpClient::new().with_latency(Duration::from_millis(50)));
    let config = GitHubConfig {
        endpoint: SEARCH_URL.to_string(),
        max_concurrent_avatars: 2,
        ..GitHubConfig::default()
    };
    let initial = RootState {
        current: Some(Current::GitHub(GitHubState::default())),
    };
    let machine = Harvester::new(initial, root::mapping(config), fixture.world.clone()).unwrap();

    let repositories: Vec<Repository> = (1..=5)
        .map(|id| {
            let mut repository = repository(id);
            repository.owner.avatar_url = format!("https://avatars.test/{id}.png");
            fixture
                .http
                .respond(repository.owner.avatar_url.clone(), HttpResponse::ok(b"png".to_vec()));
            repository
        })
        .collect();
    machine.send(RootInput::GitHub(GitHubInput::UpdateItems(repositories)));

    settle(Duration::from_millis(10)).await;
    assert_eq!(fixture.http.calls().len(), 2);
    assert_eq!(machine.running_effects(), 2);
    assert_eq!(machine.waiting_effects(), 3);

    settle(Duration::from_millis(50)).await;
    assert_eq!(fixture.http.calls().len(), 4);

    settle(Duration::from_millis(200)).await;
    assert_eq!(fixture.http.calls().len(), 5);
    assert_eq!(github_state(&machine).image_loader.images.len(), 5);
    assert_eq!(machine.running_effects(), 0);
}

fn count(state: &DebugRootState) -> i64 {
    match &state.root().current {
        Some(Current::Counter(counter)) => counter.count,
        other => panic!("expected the counter screen, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn time_travel_rewinds_and_branches() {
    init_tracing();
    let initial = DebugRootState::new(RootState {
        current: Some(Current::Counter(CounterState::default())),
    });
    let machine =
        Harvester::new(initial, debug_root::mapping(DebugRootConfig::default()), fixture().world)
            .unwrap();
    debug_root::log_dumps(&machine);
    machine.send(DebugRootInput::SetDebug(true));

    machine.send(DebugRootInput::root(RootInput::Counter(CounterInput::Increment)));
    machine.send(DebugRootInput::root(RootInput::Counter(CounterInput::Increment)));
    assert_eq!(count(&machine.state()), 2);
    assert_eq!(machine.state().time_travel.histories().len(), 3);

    machine.send(DebugRootInput::TimeTravel(TimeTravelInput::ScrubTo(1)));
    assert_eq!(count(&machine.state()), 1);
    assert!(machine.state().time_travel.is_scrubbing());

    settle(Duration::from_millis(150)).await;
    assert!(!machine.state().time_travel.is_scrubbing());

    machine.send(DebugRootInput::root(RootInput::Counter(CounterInput::Increment)));
    let state = machine.state();
    assert_eq!(count(&state), 2);
    assert_eq!(state.time_travel.histories().len(), 3);
    assert_eq!(state.time_travel.cursor(), 2);
    assert!(state.is_debug);
}

#[tokio::test(start_paused = true)]
async fn rescrubbing_keeps_scrubbing_until_the_last_scrub_settles() {
    init_tracing();
    let initial = DebugRootState::new(RootState {
        current: Some(Current::Counter(CounterState::default())),
    });
    let machine =
        Harvester::new(initial, debug_root::mapping(DebugRootConfig::default()), fixture().world)
            .unwrap();
    machine.send(DebugRootInput::SetDebug(true));
    machine.send(DebugRootInput::root(RootInput::Counter(CounterInput::Increment)));
    machine.send(DebugRootInput::root(RootInput::Counter(CounterInput::Increment)));

    machine.send(DebugRootInput::TimeTravel(TimeTravelInput::ScrubTo(2)));
    settle(Duration::from_millis(90)).await;
    machine.send(DebugRootInput::TimeTravel(TimeTravelInput::ScrubTo(1)));
    settle(Duration::from_millis(15)).await;
    assert!(machine.state().time_travel.is_scrubbing());

    machine.send(DebugRootInput::root(RootInput::Counter(CounterInput::Increment)));
    let state = machine.state();
    assert_eq!(count(&state), 2);
    assert_eq!(state.time_travel.histories().len(), 3);
    assert_eq!(state.time_travel.cursor(), 1);

    settle(Duration::from_millis(100)).await;
    assert!(!machine.state().time_travel.is_scrubbing());
}
