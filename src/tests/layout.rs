use super::fixture::*;
use crate::{
    Event, ShellError,
    action::ConfigureStates,
    output::Edge,
    scene::{Layer, rect},
    surface::{ClientId, PopupState, Stage, SurfaceHandle, SurfaceState},
};

const DSI: &str = "DSI-1";

fn size(w: i32, h: i32) -> smithay::utils::Size<i32, smithay::utils::Logical> {
    (w, h).into()
}

#[test]
fn background_covers_the_output() {
    let f = Fixture::booted();

    assert_eq!(f.layer(1), Some(Layer::Background));
    assert_eq!(f.geometry(1), rect(0, 0, 1920, 1080));
    assert!(!f.output(OUTPUT).curtain.is_shown());
    assert_eq!(
        f.last_configure(1),
        Some((size(1920, 1080), ConfigureStates::MAXIMIZED))
    );
}

#[test]
fn panels_shrink_the_usable_area() {
    let mut f = Fixture::new();
    f.add_output(OUTPUT, rect(0, 0, 1920, 1080));
    f.bind_shell();
    f.background(1, OUTPUT);
    f.panel(2, OUTPUT, Edge::Top, 40);
    assert_eq!(f.last_configure(2), Some((size(1920, 0), ConfigureStates::empty())));
    f.ready();

    assert_eq!(f.output(OUTPUT).area, rect(0, 40, 1920, 1040));
    assert_eq!(f.layer(2), Some(Layer::Panel));
    assert_eq!(f.geometry(2), rect(0, 0, 1920, 40));

    // Set after ready: laid out right away.
    f.panel(3, OUTPUT, Edge::Bottom, 60);
    assert_eq!(f.output(OUTPUT).area, rect(0, 40, 1920, 980));
    assert_eq!(f.geometry(3), rect(0, 1020, 1920, 60));
}

#[test]
fn side_panels_dock_to_their_edge() {
    let mut f = Fixture::new();
    f.add_output(DSI, rect(1920, 0, 1080, 1920));
    f.bind_shell();
    f.background(1, DSI);
    f.panel(2, DSI, Edge::Left, 80);
    f.panel(3, DSI, Edge::Right, 100);
    f.ready();

    assert_eq!(f.output(DSI).area, rect(80, 0, 900, 1920));
    assert_eq!(f.geometry(2), rect(1920, 0, 80, 1920));
    assert_eq!(f.geometry(3), rect(2900, 0, 100, 1920));
    assert_eq!(f.output(DSI).area_origin(), (2000, 0).into());
}

#[test]
fn panel_without_geometry_waits_for_content() {
    let mut f = Fixture::new();
    f.add_output(OUTPUT, rect(0, 0, 1920, 1080));
    f.bind_shell();
    f.background(1, OUTPUT);
    f.add_surface(3, SHELL_CLIENT, None);
    f.commit(3, rect(0, 0, 0, 0)).unwrap();
    f.ok(Event::SetPanel {
        surface: SurfaceHandle(3),
        output: OUTPUT.to_owned(),
        edge: 1,
    });
    f.ready();

    assert!(!f.is_mapped(3));
    assert!(f.role(3).panel().unwrap().deferred);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 1920, 1080));

    f.commit(3, rect(0, 0, 1920, 60)).unwrap();

    assert!(f.is_mapped(3));
    assert!(!f.role(3).panel().unwrap().deferred);
    assert_eq!(f.geometry(3), rect(0, 1020, 1920, 60));
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 1920, 1020));
}

#[test]
fn removing_a_panel_returns_its_extent() {
    let mut f = Fixture::booted();
    f.panel(2, OUTPUT, Edge::Top, 40);
    f.launch(10, "nav");
    assert_eq!(f.geometry(10), rect(0, 40, 1920, 1040));

    f.destroy(2);

    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 1920, 1080));
    assert!(f.output(OUTPUT).edge(Edge::Top).is_none());
    assert_eq!(
        f.last_configure(10),
        Some((size(1920, 1080), ConfigureStates::MAXIMIZED))
    );
}

#[test]
fn curtain_covers_outputs_with_nothing_to_show() {
    let mut f = Fixture::new();
    f.add_output(OUTPUT, rect(0, 0, 1920, 1080));
    assert!(f.output(OUTPUT).curtain.is_shown());
    f.bind_shell();
    f.ready();
    assert!(f.output(OUTPUT).curtain.is_shown());

    let mut f = Fixture::booted();
    f.launch(10, "nav");
    f.destroy(1);
    assert!(f.output(OUTPUT).background.is_none());
    assert!(!f.output(OUTPUT).curtain.is_shown());

    f.destroy(10);
    assert!(f.output(OUTPUT).active.is_none());
    assert!(f.output(OUTPUT).curtain.is_shown());
    let curtain = f.output(OUTPUT).curtain.view;
    assert_eq!(f.shell.scene.layer_views(Layer::Background), &[curtain]);
}

#[test]
fn split_takes_half_of_the_area_and_gives_it_back() {
    let mut f = Fixture::booted();
    f.launch(10, "nav");
    f.property("map", 2, OUTPUT);
    f.add_app(20, "map");

    f.commit(20, rect(0, 0, 100, 100)).unwrap();
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 960, 1080));
    assert_eq!(f.last_configure(20), Some((size(960, 1080), ConfigureStates::empty())));
    assert_eq!(f.layer(20), Some(Layer::Hidden));

    f.ack(20).unwrap();
    assert_eq!(f.layer(20), Some(Layer::Normal));
    assert_eq!(f.geometry(20), rect(960, 0, 960, 1080));
    assert_eq!(f.role(20).split().unwrap().stage, Stage::Committed);
    assert_eq!(
        f.last_configure(10),
        Some((size(960, 1080), ConfigureStates::MAXIMIZED))
    );
    f.ack(10).unwrap();
    assert_eq!(f.geometry(10), rect(0, 0, 960, 1080));

    // A second split on the same output is refused.
    f.property("map2", 3, OUTPUT);
    f.add_app(21, "map2");
    f.commit(21, rect(0, 0, 100, 100)).unwrap();
    assert_eq!(f.role(21).split().unwrap().stage, Stage::Unstaged);
    assert!(f.configures(21).is_empty());

    f.destroy(20);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 1920, 1080));
    assert!(f.output(OUTPUT).split.is_none());
    assert_eq!(
        f.last_configure(10),
        Some((size(1920, 1080), ConfigureStates::MAXIMIZED))
    );
}

/// Nav active, "map" split vertically and acked.
fn split_map(f: &mut Fixture) {
    f.launch(10, "nav");
    f.property("map", 2, OUTPUT);
    f.add_app(20, "map");
    f.commit(20, rect(0, 0, 100, 100)).unwrap();
    f.ack(20).unwrap();
    assert_eq!(f.role(20).split().unwrap().stage, Stage::Committed);
}

#[test]
fn panel_removed_under_a_split_returns_its_extent() {
    let mut f = Fixture::booted();
    f.panel(2, OUTPUT, Edge::Top, 40);
    split_map(&mut f);
    assert_eq!(f.output(OUTPUT).area, rect(0, 40, 960, 1040));
    assert_eq!(f.geometry(20), rect(960, 40, 960, 1040));

    f.destroy(2);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 960, 1080));
    assert_eq!(f.last_configure(20), Some((size(960, 1080), ConfigureStates::empty())));
    f.ack(20).unwrap();
    assert_eq!(f.geometry(20), rect(960, 0, 960, 1080));

    f.destroy(20);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 1920, 1080));
    assert_eq!(
        f.last_configure(10),
        Some((size(1920, 1080), ConfigureStates::MAXIMIZED))
    );
}

#[test]
fn panel_added_under_a_split_stays_reserved() {
    let mut f = Fixture::booted();
    split_map(&mut f);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 960, 1080));

    f.panel(3, OUTPUT, Edge::Bottom, 60);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 960, 1020));
    assert_eq!(f.last_configure(20), Some((size(960, 1020), ConfigureStates::empty())));
    assert_eq!(f.geometry(3), rect(0, 1020, 1920, 60));

    f.destroy(20);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 1920, 1020));
    assert!(f.output(OUTPUT).edge(Edge::Bottom).is_some());
}

#[test]
fn split_survives_a_shell_client_restart() {
    let mut f = Fixture::booted();
    f.panel(2, OUTPUT, Edge::Top, 40);
    split_map(&mut f);

    f.ok(Event::ShellGone);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 960, 1080));

    f.bind_shell();
    f.background(3, OUTPUT);
    f.ready();
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 960, 1080));
    assert_eq!(f.output(OUTPUT).split, Some(f.id(20)));

    f.destroy(20);
    assert_eq!(f.output(OUTPUT).area, rect(0, 0, 1920, 1080));
}

#[test]
fn popup_is_placed_at_its_anchor() {
    let mut f = Fixture::booted();
    f.add_output(DSI, rect(1920, 0, 1080, 1920));
    f.ok(Event::SetAppProperty {
        app_id: "nav-popup".to_owned(),
        role: 0,
        x: 100,
        y: 50,
        clip: Some(rect(0, 0, 200, 100)),
        output: DSI.to_owned(),
    });
    f.add_app(30, "nav-popup");
    f.commit(30, rect(0, 0, 400, 300)).unwrap();

    assert_eq!(f.layer(30), Some(Layer::Popup));
    assert_eq!(f.geometry(30), rect(2020, 50, 400, 300));
    let view = f.shell.view_of(f.id(30)).unwrap();
    assert_eq!(view.clip, Some(rect(0, 0, 200, 100)));
    assert_eq!(view.output, f.shell.output_by_name(DSI));

    f.deactivate("nav-popup");
    assert!(!f.is_mapped(30));
    assert_eq!(f.role(30).popup().unwrap().state, PopupState::Hidden);

    // Deactivated popups stay hidden until activated again.
    f.commit(30, rect(0, 0, 400, 300)).unwrap();
    assert!(!f.is_mapped(30));
    f.activate("nav-popup", DSI);
    assert!(f.is_mapped(30));
    assert_eq!(f.role(30).popup().unwrap().state, PopupState::Shown);
}

#[test]
fn popup_without_anchor_uses_its_own_offset() {
    let mut f = Fixture::booted();
    f.ok(Event::SetAppProperty {
        app_id: "osd".to_owned(),
        role: 0,
        x: 0,
        y: 0,
        clip: Some(rect(0, 0, 0, 0)),
        output: OUTPUT.to_owned(),
    });
    f.add_app(30, "osd");
    f.commit(30, rect(10, 20, 400, 300)).unwrap();

    assert_eq!(f.geometry(30), rect(10, 20, 400, 300));
    assert_eq!(f.shell.view_of(f.id(30)).unwrap().clip, None);
}

#[test]
fn fullscreen_is_shown_once_it_fills_the_output() {
    let mut f = Fixture::booted();
    f.property("video", 1, OUTPUT);
    f.add_app(40, "video");
    f.commit(40, rect(0, 0, 640, 480)).unwrap();

    assert_eq!(
        f.last_configure(40),
        Some((size(1920, 1080), ConfigureStates::FULLSCREEN))
    );
    assert_eq!(f.layer(40), Some(Layer::Hidden));
    assert_eq!(f.output(OUTPUT).fullscreen, Some(f.id(40)));

    // Not yet fullscreen: still resizing, nothing to check.
    f.commit(40, rect(0, 0, 800, 600)).unwrap();
    assert_eq!(f.layer(40), Some(Layer::Hidden));

    f.ack(40).unwrap();
    assert_eq!(f.layer(40), Some(Layer::Fullscreen));
    assert_eq!(f.geometry(40), rect(0, 0, 1920, 1080));

    f.destroy(40);
    assert!(f.output(OUTPUT).fullscreen.is_none());
}

#[test]
fn fullscreen_at_output_size_is_shown_on_its_first_commit() {
    let mut f = Fixture::booted();
    f.property("video", 1, OUTPUT);
    f.add_app(40, "video");
    f.commit(40, rect(0, 0, 1920, 1080)).unwrap();

    assert_eq!(f.layer(40), Some(Layer::Fullscreen));
    assert_eq!(f.role(40).fullscreen().unwrap().stage, Stage::Committed);
    assert_eq!(
        f.last_configure(40),
        Some((size(1920, 1080), ConfigureStates::FULLSCREEN))
    );
}

#[test]
fn fullscreen_geometry_violation_kills_the_client() {
    let mut f = Fixture::booted();
    f.property("video", 1, OUTPUT);
    f.add_app(40, "video");
    f.commit(40, rect(0, 0, 640, 480)).unwrap();

    let err = f
        .commit_state(
            40,
            SurfaceState {
                geometry: rect(0, 0, 1280, 720),
                maximized: false,
                fullscreen: true,
            },
        )
        .unwrap_err();

    assert!(matches!(
        err,
        ShellError::GeometryViolation {
            expected: (1920, 1080),
            got: (1280, 720),
            ..
        }
    ));
    assert!(err.is_client_fatal());
    assert_eq!(f.kills(), vec![ClientId(140)]);
    assert!(!f.is_mapped(40));
}

#[test]
fn outputs_come_and_go() {
    let mut f = Fixture::booted();
    f.launch(10, "nav");
    f.property("osd", 0, OUTPUT);

    let dsi = f.add_output(DSI, rect(1920, 0, 1080, 1920));
    assert!(f.output(DSI).curtain.is_shown());
    assert_eq!(f.output(DSI).area, rect(0, 0, 1080, 1920));
    assert!(f.shell.take_damage().contains(&dsi));

    f.ok(Event::OutputRemoved {
        name: OUTPUT.to_owned(),
    });
    assert!(f.shell.output_by_name(OUTPUT).is_none());
    assert!(!f.is_mapped(10));
    assert!(!f.is_mapped(1));
    assert!(f.shell.pending.is_empty());

    // Stale output handles resolve to nothing.
    f.commit(10, rect(0, 0, 1920, 1080)).unwrap();
    f.activate("nav", OUTPUT);
    assert!(!f.is_mapped(10));
}

#[test]
fn shell_client_loss_resets_every_output() {
    let mut f = Fixture::booted();
    f.panel(2, OUTPUT, Edge::Top, 40);
    f.launch(10, "nav");

    f.ok(Event::ShellGone);

    let output = f.output(OUTPUT);
    assert!(output.background.is_none());
    assert!(output.active.is_none());
    assert!(output.previous_active.is_none());
    assert_eq!(output.panels().count(), 0);
    assert!(output.curtain.is_shown());
    assert!(!f.shell.ready);
    assert!(!f.is_mapped(1));
    assert!(!f.is_mapped(2));
    assert!(!f.is_mapped(10));

    f.ok(Event::BindShell {
        client: ClientId(7),
    });
    assert_eq!(f.shell.shell_client, Some(ClientId(7)));
}
