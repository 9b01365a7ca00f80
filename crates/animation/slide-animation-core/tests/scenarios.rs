use std::cell::RefCell;
use std::rc::Rc;

use slide_animation_core::{
    AnimationDescriptor, AnimationEngine, ElementSpec, ElementState, EngineEvent, PlaybackMode,
};

fn fade(duration_ms: u64) -> AnimationDescriptor {
    AnimationDescriptor::new("fadeIn", duration_ms)
}

#[derive(Default)]
struct Counters {
    enter: usize,
    emphasis: usize,
    exit: usize,
    groups: Vec<(u32, bool)>,
}

fn subscribe(engine: &mut AnimationEngine) -> Rc<RefCell<Counters>> {
    let counters = Rc::new(RefCell::new(Counters::default()));
    let c = counters.clone();
    engine.on_enter_complete(move || c.borrow_mut().enter += 1);
    let c = counters.clone();
    engine.on_emphasis_complete(move || c.borrow_mut().emphasis += 1);
    let c = counters.clone();
    engine.on_exit_complete(move || c.borrow_mut().exit += 1);
    let c = counters.clone();
    engine.on_group_complete(move |group, is_last| c.borrow_mut().groups.push((group, is_last)));
    counters
}

#[test]
fn scenario_a_sequential_groups_advance_on_completion() {
    let mut engine = AnimationEngine::default();
    engine
        .add_element("title", ElementSpec::new().enter(fade(600)).group(0))
        .add_element(
            "body",
            ElementSpec::new().enter(fade(800).with_delay(200)).group(1),
        )
        .set_mode(PlaybackMode::Sequential);
    let counters = subscribe(&mut engine);

    engine.start_grouped();
    assert_eq!(engine.element_state("title"), Some(ElementState::Entering));
    assert_eq!(engine.element_state("body"), Some(ElementState::Hidden));

    engine.advance(599);
    assert!(counters.borrow().groups.is_empty());

    let out = engine.advance(1);
    assert_eq!(out.now_ms, 600);
    assert_eq!(counters.borrow().groups, vec![(0, false)]);
    // Group 1 begins at the same instant
    assert_eq!(engine.element_state("body"), Some(ElementState::Entering));
    assert_eq!(engine.get_current_group(), 1);
    assert!(out.events.contains(&EngineEvent::GroupStarted { group: 1, index: 1 }));

    engine.advance(999);
    assert_eq!(counters.borrow().enter, 0);

    let out = engine.advance(1);
    assert_eq!(out.now_ms, 1600);
    assert_eq!(counters.borrow().groups, vec![(0, false), (1, true)]);
    assert_eq!(counters.borrow().enter, 1);
    assert!(engine.is_all_groups_complete());
    assert!(engine.is_enter_complete());
}

#[test]
fn scenario_b_group_waits_for_slowest_member() {
    let mut engine = AnimationEngine::default();
    engine
        .add_element("quick", ElementSpec::new().enter(fade(500)).group(0))
        .add_element("slow", ElementSpec::new().enter(fade(900)).group(0));
    let counters = subscribe(&mut engine);
    engine.start_grouped();

    engine.advance(500);
    assert_eq!(engine.element_state("quick"), Some(ElementState::Visible));
    assert!(counters.borrow().groups.is_empty());
    assert!(!engine.is_all_groups_complete());

    let out = engine.advance(400);
    assert_eq!(out.now_ms, 900);
    assert_eq!(counters.borrow().groups, vec![(0, true)]);

    engine.run_until_idle();
    assert_eq!(counters.borrow().groups, vec![(0, true)]);
    assert_eq!(counters.borrow().enter, 1);
}

#[test]
fn scenario_c_skip_right_after_start_grouped_notifies_once_each() {
    let mut engine = AnimationEngine::default();
    engine
        .add_element(
            "title",
            ElementSpec::new()
                .enter(fade(600))
                .emphasis(AnimationDescriptor::new("pulse", 300))
                .exit(AnimationDescriptor::new("fadeOut", 400))
                .group(0),
        )
        .add_element("body", ElementSpec::new().enter(fade(800)).group(1));
    let counters = subscribe(&mut engine);

    engine.start_grouped();
    engine.skip();
    {
        let c = counters.borrow();
        assert_eq!((c.enter, c.emphasis, c.exit), (1, 1, 1));
    }
    assert_eq!(engine.element_state("title"), Some(ElementState::Visible));
    assert_eq!(engine.element_state("body"), Some(ElementState::Visible));
    assert!(engine.is_all_groups_complete());
    assert!(engine.is_emphasis_complete());
    assert!(engine.is_exit_complete());

    // Originally scheduled timers are gone or stale
    let out = engine.run_until_idle();
    assert_eq!(out.count(|e| matches!(e, EngineEvent::EnterComplete)), 1);
    assert_eq!(out.count(|e| matches!(e, EngineEvent::Skipped)), 1);
    let c = counters.borrow();
    assert_eq!((c.enter, c.emphasis, c.exit), (1, 1, 1));
    assert!(c.groups.is_empty());
}

#[test]
fn scenario_e_missing_phases_are_vacuously_complete() {
    let mut engine = AnimationEngine::default();
    engine.add_element("only", ElementSpec::new().enter(fade(300)).group(0));
    engine.start_grouped();
    engine.run_until_idle();

    assert!(engine.is_all_groups_complete());
    assert!(!engine.has_emphasis());
    assert!(!engine.has_exit());
    assert!(engine.is_emphasis_complete());
    assert!(engine.is_exit_complete());
}
