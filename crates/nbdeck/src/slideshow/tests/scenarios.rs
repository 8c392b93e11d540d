use super::*;
use crate::slideshow::classify::PageKind;
use crate::slideshow::host::HostCommand;
use pretty_assertions::assert_eq;
use SlideType::*;

#[test]
fn leading_markdown_then_fragments() {
    let mut host = MockHost::default();
    let mut show = start(
        &[None, Some(Slide), Some(Fragment), Some(Fragment), Some(Slide)],
        StartMode::First,
        &mut host,
    );

    let layout = show.session().unwrap().layout();
    assert_eq!(layout.len(), 2);
    assert_eq!(layout.pages()[0].index(), 1);
    assert_eq!(layout.pages()[0].fragments.len(), 2);
    assert!(host.is_visible(0));
    assert!(!host.is_visible(2));

    assert_eq!(press(&mut show, &mut host, NavKey::Space), Outcome::Revealed);
    assert_eq!(press(&mut show, &mut host, NavKey::Space), Outcome::Revealed);
    assert_eq!(press(&mut show, &mut host, NavKey::Space), Outcome::Paged);
    assert_eq!(page_index(&show), 1);
    assert_eq!(active_index(&show), 4);
    assert_eq!(host.selected, 4);
    assert!(host.is_visible(4));
    assert!(!host.is_visible(1));
    // Hidden with its page, but still remembered as revealed.
    assert!(host.style(2).revealed);
}

#[test]
fn first_subslide_is_promoted() {
    let mut host = MockHost::default();
    let show = start(&[Some(Subslide), Some(Slide)], StartMode::First, &mut host);
    let layout = show.session().unwrap().layout();
    assert_eq!(layout.pages()[0].kind(), PageKind::Slide);
    assert_eq!(layout.pages()[1].kind(), PageKind::Slide);
}

#[test]
fn skipped_cell_is_never_touched() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), Some(Skip), Some(Slide)], StartMode::First, &mut host);
    let session = show.session().unwrap();
    assert!(!session.layout().anchors().contains(&1));
    assert!(session.layout().owner_of(1).is_none());

    press(&mut show, &mut host, NavKey::Space);
    assert_eq!(page_index(&show), 1);
    assert!(!host.styles.contains_key(&1));
}

#[test]
fn backward_keys_with_hidden_fragment_do_nothing() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), Some(Fragment)], StartMode::First, &mut host);
    assert_eq!(press(&mut show, &mut host, NavKey::Up), Outcome::Unchanged);
    assert_eq!(press(&mut show, &mut host, NavKey::Left), Outcome::Unchanged);
    assert_eq!(page_index(&show), 0);
    assert!(!host.is_visible(1));
}

#[test]
fn right_and_left_jump_over_subslides() {
    let mut host = MockHost::default();
    let mut show = start(
        &[Some(Slide), Some(Subslide), Some(Subslide), Some(Slide)],
        StartMode::First,
        &mut host,
    );
    assert_eq!(press(&mut show, &mut host, NavKey::Right), Outcome::Paged);
    assert_eq!(page_index(&show), 3);
    assert_eq!(press(&mut show, &mut host, NavKey::Left), Outcome::Paged);
    assert_eq!(page_index(&show), 0);
}

#[test]
fn right_refuses_trailing_subslide() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), Some(Slide), Some(Subslide)], StartMode::First, &mut host);
    assert_eq!(press(&mut show, &mut host, NavKey::Right), Outcome::Paged);
    assert_eq!(press(&mut show, &mut host, NavKey::Right), Outcome::Unchanged);
    assert_eq!(page_index(&show), 1);
    // Space still walks into it.
    assert_eq!(press(&mut show, &mut host, NavKey::Space), Outcome::Paged);
    assert_eq!(page_index(&show), 2);
}

#[test]
fn down_and_up_stay_within_a_subslide_stack() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), Some(Subslide), Some(Slide)], StartMode::First, &mut host);
    assert_eq!(press(&mut show, &mut host, NavKey::Up), Outcome::Unchanged);
    assert_eq!(press(&mut show, &mut host, NavKey::Down), Outcome::Paged);
    assert_eq!(page_index(&show), 1);
    assert_eq!(press(&mut show, &mut host, NavKey::Down), Outcome::Unchanged);
    assert_eq!(press(&mut show, &mut host, NavKey::Up), Outcome::Paged);
    assert_eq!(page_index(&show), 0);
}

#[test]
fn left_keeps_revealed_fragments() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), Some(Fragment), Some(Slide)], StartMode::First, &mut host);
    press(&mut show, &mut host, NavKey::Space);
    press(&mut show, &mut host, NavKey::Space);
    assert!(!host.is_visible(1));

    assert_eq!(press(&mut show, &mut host, NavKey::Left), Outcome::Paged);
    assert_eq!(page_index(&show), 0);
    assert!(host.is_visible(1));
    assert_eq!(active_index(&show), 0);

    // Forward first moves focus onto the fragment that is already showing.
    assert_eq!(press(&mut show, &mut host, NavKey::Right), Outcome::Refocused);
    assert_eq!(active_index(&show), 1);
}

fn revisit_subslide(key: NavKey) -> MockHost {
    let mut host = MockHost::default();
    let mut show = start(
        &[Some(Slide), Some(Subslide), Some(Fragment), Some(Slide)],
        StartMode::First,
        &mut host,
    );
    press(&mut show, &mut host, NavKey::Down);
    assert_eq!(press(&mut show, &mut host, NavKey::Space), Outcome::Revealed);
    press(&mut show, &mut host, NavKey::Space);
    assert_eq!(page_index(&show), 2);
    // Back to the first slide, passing over the subslide.
    press(&mut show, &mut host, NavKey::Left);
    assert_eq!(page_index(&show), 0);

    assert_eq!(press(&mut show, &mut host, key), Outcome::Paged);
    assert_eq!(page_index(&show), 1);
    host
}

#[test]
fn down_resets_fragments_on_arrival() {
    let host = revisit_subslide(NavKey::Down);
    assert!(!host.is_visible(2));
    assert!(!host.style(2).revealed);
}

#[test]
fn space_restores_fragments_on_arrival() {
    let host = revisit_subslide(NavKey::Space);
    assert!(host.is_visible(2));
}

#[test]
fn retracting_steps_focus_back() {
    let mut host = MockHost::default();
    let mut show = start(
        &[Some(Slide), Some(Fragment), None, Some(Fragment)],
        StartMode::First,
        &mut host,
    );
    press(&mut show, &mut host, NavKey::Space);
    assert!(host.is_visible(2), "fragment child follows its fragment");
    press(&mut show, &mut host, NavKey::Space);
    assert_eq!(active_index(&show), 3);

    assert_eq!(press(&mut show, &mut host, NavKey::Left), Outcome::Retracted);
    assert!(!host.is_visible(3));
    assert_eq!(active_index(&show), 1);

    assert_eq!(press(&mut show, &mut host, NavKey::Up), Outcome::Retracted);
    assert!(!host.is_visible(1));
    assert!(!host.is_visible(2));
    assert_eq!(active_index(&show), 0);
    assert_eq!(host.selected, 0);
}

#[test]
fn fragments_animate_in_but_not_out() {
    let mut host = MockHost::default();
    let mut notebook = notebook(&[Some(Slide), Some(Fragment)]);
    if let Some(meta) = notebook.cells[1].metadata.slideshow.as_mut() {
        meta.transition = Some("fade".to_string());
    }
    let mut show = Slideshow::new(TransitionDefaults::default());
    block_on(show.start(StartMode::First, &notebook, &mut host)).unwrap();

    press(&mut show, &mut host, NavKey::Space);
    let animation = host.style(1).animation.unwrap();
    assert_eq!(animation.class.to_string(), "fade-in");

    press(&mut show, &mut host, NavKey::Left);
    assert_eq!(host.style(1).animation, None);
}

#[test]
fn page_change_uses_destination_transition() {
    let mut host = MockHost::default();
    let mut notebook = notebook(&[Some(Slide), None, Some(Subslide)]);
    if let Some(meta) = notebook.cells[2].metadata.slideshow.as_mut() {
        meta.transition = Some("slide".to_string());
        meta.transition_duration = Some(0.8);
    }
    let mut show = Slideshow::new(TransitionDefaults::default());
    block_on(show.start(StartMode::First, &notebook, &mut host)).unwrap();

    press(&mut show, &mut host, NavKey::Down);
    let shown = host.style(2).animation.unwrap();
    assert_eq!(shown.class.to_string(), "slide-in-up");
    assert_eq!(shown.duration, Some(0.8));
    assert_eq!(host.style(0).animation.unwrap().class.to_string(), "slide-out-up");
    // Children share their page's animation.
    assert_eq!(host.style(1).animation, host.style(0).animation);

    press(&mut show, &mut host, NavKey::Up);
    assert_eq!(host.style(0).animation, None, "first page has no transition of its own");
    assert_eq!(host.style(2).animation, None);
}

#[test]
fn run_cell_advances_like_space() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), Some(Slide)], StartMode::First, &mut host);
    let event = HostEvent::CommandExecuted(HostCommand::RunCellAndSelectNext);
    assert_eq!(show.handle_event(&event, &mut host), Outcome::Paged);
    assert_eq!(page_index(&show), 1);
}

#[test]
fn run_cell_at_end_of_deck_keeps_selection() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), None, Some(Slide), None], StartMode::First, &mut host);
    press(&mut show, &mut host, NavKey::Space);
    assert_eq!(active_index(&show), 2);

    // The host has already selected the next cell when it reports the command.
    host.selected = 3;
    let event = HostEvent::CommandExecuted(HostCommand::RunCellAndSelectNext);
    assert_eq!(show.handle_event(&event, &mut host), Outcome::Unchanged);
    assert_eq!(page_index(&show), 1);
    assert_eq!(host.selected, active_index(&show));
}

#[test]
fn cursor_moves_are_pinned_to_active_cell() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), None, Some(Slide)], StartMode::First, &mut host);
    host.selected = 1;
    let event = HostEvent::CommandExecuted(HostCommand::MoveCursorDown);
    assert_eq!(show.handle_event(&event, &mut host), Outcome::Unchanged);
    assert_eq!(host.selected, 0);

    let other = HostEvent::CommandExecuted(HostCommand::Other("notebook:save".into()));
    assert_eq!(show.handle_event(&other, &mut host), Outcome::Unchanged);
}

#[test]
fn escape_ends_the_session() {
    let mut host = MockHost::default();
    let mut show = start(&[Some(Slide), Some(Slide)], StartMode::First, &mut host);
    assert_eq!(press(&mut show, &mut host, NavKey::Escape), Outcome::Exit);
    assert!(!show.is_active());
    assert!(host.is_restored());
    assert_eq!(press(&mut show, &mut host, NavKey::Space), Outcome::Unchanged);
}

#[test]
fn start_from_current_fragment_reveals_earlier_fragments() {
    let mut host = MockHost::with_selection(3);
    let show = start(
        &[Some(Slide), Some(Fragment), Some(Fragment), Some(Fragment), Some(Slide)],
        StartMode::Current,
        &mut host,
    );
    assert_eq!(page_index(&show), 0);
    assert_eq!(active_index(&show), 3);
    assert!(host.is_visible(1));
    assert!(host.is_visible(2));
    assert!(host.is_visible(3));
    assert!(!host.is_visible(4));
    assert_eq!(host.selected, 3);
}

#[test]
fn start_from_current_child_uses_floor_page() {
    let mut host = MockHost::with_selection(3);
    let show = start(
        &[Some(Slide), None, Some(Slide), None, Some(Slide)],
        StartMode::Current,
        &mut host,
    );
    assert_eq!(page_index(&show), 1);
    assert_eq!(active_index(&show), 2);
    assert!(host.is_visible(3));
    assert!(!host.is_visible(0));
}

/// Give every typed cell in `notebook` the same named transition.
fn with_transition(notebook: &mut Notebook, name: &str) {
    for cell in &mut notebook.cells {
        if let Some(meta) = cell.metadata.slideshow.as_mut() {
            meta.transition = Some(name.to_string());
        }
    }
}

fn start_notebook(notebook: &Notebook, host: &mut MockHost) -> Slideshow {
    let mut show = Slideshow::new(TransitionDefaults::default());
    block_on(show.start(StartMode::First, notebook, host)).unwrap();
    show
}

fn class_of(host: &MockHost, index: usize) -> Option<String> {
    host.style(index).animation.map(|a| a.class.to_string())
}

#[test]
fn slide_dir_overrides_page_axis() {
    let mut host = MockHost::default();
    let mut notebook = notebook(&[Some(Slide), Some(Slide)]);
    with_transition(&mut notebook, "slide");
    if let Some(meta) = notebook.cells[1].metadata.slideshow.as_mut() {
        meta.slide_dir = Some("vertical".to_string());
    }
    let mut show = start_notebook(&notebook, &mut host);

    assert_eq!(press(&mut show, &mut host, NavKey::Right), Outcome::Paged);
    assert_eq!(class_of(&host, 1).as_deref(), Some("slide-in-up"));
    assert_eq!(class_of(&host, 0).as_deref(), Some("slide-out-up"));
}

#[test]
fn moving_back_slides_the_other_way() {
    let mut host = MockHost::default();
    let mut notebook = notebook(&[Some(Slide), Some(Slide)]);
    with_transition(&mut notebook, "slide");
    let mut show = start_notebook(&notebook, &mut host);

    press(&mut show, &mut host, NavKey::Right);
    assert_eq!(class_of(&host, 1).as_deref(), Some("slide-in-left"));
    assert_eq!(class_of(&host, 0).as_deref(), Some("slide-out-left"));

    assert_eq!(press(&mut show, &mut host, NavKey::Left), Outcome::Paged);
    assert_eq!(class_of(&host, 0).as_deref(), Some("slide-in-right"));
    assert_eq!(class_of(&host, 1).as_deref(), Some("slide-out-right"));
}

#[test]
fn moving_up_from_a_subslide_slides_down() {
    let mut host = MockHost::default();
    let mut notebook = notebook(&[Some(Slide), Some(Subslide)]);
    with_transition(&mut notebook, "slide");
    let mut show = start_notebook(&notebook, &mut host);

    press(&mut show, &mut host, NavKey::Down);
    assert_eq!(class_of(&host, 1).as_deref(), Some("slide-in-up"));

    assert_eq!(press(&mut show, &mut host, NavKey::Up), Outcome::Paged);
    assert_eq!(page_index(&show), 0);
    assert_eq!(class_of(&host, 0).as_deref(), Some("slide-in-down"));
    assert_eq!(class_of(&host, 1).as_deref(), Some("slide-out-down"));
}

#[test]
fn hide_code_is_styled_for_the_session_only() {
    let mut host = MockHost::default();
    let mut notebook = notebook(&[Some(Slide), Some(Slide)]);
    if let Some(meta) = notebook.cells[1].metadata.slideshow.as_mut() {
        meta.hide_code = Some(true);
    }
    let mut show = start_notebook(&notebook, &mut host);
    assert!(host.style(1).hide_code);
    assert!(!host.style(0).hide_code);

    press(&mut show, &mut host, NavKey::Right);
    assert!(host.is_visible(1));
    assert!(host.style(1).hide_code);

    show.exit(&mut host);
    assert!(!host.style(1).hide_code);
    assert!(host.is_restored());
}
