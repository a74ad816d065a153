mod common;

use city_traffic::simulation::{
    Action, AgentId, AgentKind, AgentState, Coord, Direction, NavAgent, NavState, Perception,
    SimId, StaticEntitySpec, StepOutcome, StaticWorld, REPLAN_WAIT_THRESHOLD,
};

use common::{corridor, corridor_static};

fn place(world: &mut StaticWorld, id: usize, kind: AgentKind, at: Coord, goal: Option<Coord>) -> NavAgent {
    let id = AgentId(SimId(1000 + id));
    let agent = NavAgent::new(id, kind, at, goal, &world.grid, REPLAN_WAIT_THRESHOLD);
    world.grid.insert_agent(id, kind, at).expect("agent placed");
    agent
}

#[test]
fn test_new_agent_plans_route() {
    let mut world = corridor_static(&[]);
    let car = place(&mut world, 0, AgentKind::Car, corridor(2), Some(corridor(9)));

    assert_eq!(car.state(), AgentState::Active(NavState::Moving));
    assert_eq!(car.orientation(), Direction::Up);
    assert_eq!(car.remaining_path().len(), 7);
    assert_eq!(car.path_cursor(), 0);
}

#[test]
fn test_agent_arrives_on_first_step_at_destination() {
    let mut world = corridor_static(&[]);
    let mut car = place(&mut world, 0, AgentKind::Car, corridor(9), Some(corridor(9)));

    let outcome = car.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(outcome, StepOutcome::Arrived);
    assert_eq!(car.state(), AgentState::Arrived);
    assert_eq!(car.nav_state(), None);
    assert_eq!(car.state().to_string(), "ARRIVED");

    // Arrived is terminal
    let outcome = car.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(outcome, StepOutcome::Arrived);
}

#[test]
fn test_agent_moves_along_route() {
    let mut world = corridor_static(&[]);
    let mut car = place(&mut world, 0, AgentKind::Car, corridor(0), Some(corridor(9)));

    car.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(car.coord(), corridor(1));
    assert_eq!(car.orientation(), Direction::Right);
    assert_eq!(car.nav_state(), Some(NavState::Moving));
    assert_eq!(car.steps_taken(), 1);
    assert_eq!(car.path_cursor(), 1);

    let cell = world.grid.cell_at(corridor(1)).expect("cell");
    assert!(cell.has_agent_of_kind(AgentKind::Car));
    let cell = world.grid.cell_at(corridor(0)).expect("cell");
    assert!(!cell.has_agent_of_kind(AgentKind::Car));
}

#[test]
fn test_rear_car_waits_for_lead_car() {
    let mut world = corridor_static(&[]);
    let mut rear = place(&mut world, 0, AgentKind::Car, corridor(0), Some(corridor(9)));
    let mut lead = place(&mut world, 1, AgentKind::Car, corridor(1), Some(corridor(9)));

    rear.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(rear.coord(), corridor(0));
    assert_eq!(rear.nav_state(), Some(NavState::AvoidingCollision));
    assert!(rear.is_waiting());

    lead.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(lead.coord(), corridor(2));

    rear.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(rear.coord(), corridor(1));
    assert_eq!(rear.nav_state(), Some(NavState::Moving));
    assert_eq!(rear.consecutive_waits(), 0);
}

#[test]
fn test_long_wait_triggers_replan() {
    let mut world = corridor_static(&[]);
    let mut rear = place(&mut world, 0, AgentKind::Car, corridor(0), Some(corridor(9)));
    let _lead = place(&mut world, 1, AgentKind::Car, corridor(1), Some(corridor(9)));

    for waited in 1..=REPLAN_WAIT_THRESHOLD {
        rear.step(&mut world.grid, &world.lights).expect("step");
        assert_eq!(rear.nav_state(), Some(NavState::AvoidingCollision));
        assert_eq!(rear.consecutive_waits(), waited);
    }

    rear.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(rear.nav_state(), Some(NavState::PlanningRoute));
    assert_eq!(rear.consecutive_waits(), 0);
    assert_eq!(rear.coord(), corridor(0));
    assert_eq!(rear.remaining_path().len(), 9);

    rear.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(rear.nav_state(), Some(NavState::AvoidingCollision));
}

#[test]
fn test_unreachable_destination_leaves_agent_blocked() {
    let mut world = corridor_static(&[]);
    let mut car = place(&mut world, 0, AgentKind::Car, corridor(5), Some(corridor(0)));
    assert!(car.remaining_path().is_empty());

    for _ in 0..3 {
        let outcome = car.step(&mut world.grid, &world.lights).expect("step");
        assert_eq!(outcome, StepOutcome::Continue);
        assert_eq!(car.nav_state(), Some(NavState::Blocked));
        assert_eq!(car.coord(), corridor(5));
    }
}

#[test]
fn test_agent_without_destination_stays_blocked() {
    let mut world = corridor_static(&[]);
    let mut car = place(&mut world, 0, AgentKind::Car, corridor(3), None);

    car.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(car.nav_state(), Some(NavState::Blocked));
    assert_eq!(car.coord(), corridor(3));
    assert!(!car.replan(&world.grid));
}

#[test]
fn test_car_waits_on_red_and_goes_on_green() {
    let mut world = corridor_static(&[StaticEntitySpec::traffic_light(corridor(5), false, 3)]);
    let mut car = place(&mut world, 0, AgentKind::Car, corridor(4), Some(corridor(9)));

    car.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(car.nav_state(), Some(NavState::WaitingOnSignal));
    assert_eq!(car.coord(), corridor(4));

    for light in world.lights.values_mut() {
        light.tick(3);
    }
    car.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(car.nav_state(), Some(NavState::Moving));
    assert_eq!(car.coord(), corridor(5));
}

#[test]
fn test_pedestrian_crosses_only_on_red() {
    let mut entities = Vec::new();
    for x in 0..5 {
        entities.push(StaticEntitySpec::sidewalk(Coord::new(x, 0), Direction::Right));
    }
    entities.push(StaticEntitySpec::traffic_light(Coord::new(2, 0), true, 2));
    let mut world =
        city_traffic::simulation::build_world(5, 1, &entities).expect("world builds");
    let mut walker = place(
        &mut world,
        0,
        AgentKind::Pedestrian,
        Coord::new(1, 0),
        Some(Coord::new(4, 0)),
    );

    walker.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(walker.nav_state(), Some(NavState::WaitingOnSignal));
    assert_eq!(walker.coord(), Coord::new(1, 0));

    for light in world.lights.values_mut() {
        light.tick(2);
    }
    walker.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(walker.coord(), Coord::new(2, 0));
}

#[test]
fn test_pedestrian_yields_to_car_on_crossing() {
    let mut entities = common::corridor_entities(Some(corridor(9)));
    entities.push(StaticEntitySpec::sidewalk(Coord::new(3, 4), Direction::Up));
    entities.push(StaticEntitySpec::pedestrian_walk(corridor(3), Direction::Up));
    entities.push(StaticEntitySpec::sidewalk(Coord::new(3, 6), Direction::Up));
    let mut world = city_traffic::simulation::build_world(10, 10, &entities).expect("builds");

    let mut walker = place(
        &mut world,
        0,
        AgentKind::Pedestrian,
        Coord::new(3, 4),
        Some(Coord::new(3, 6)),
    );
    let _car = place(&mut world, 1, AgentKind::Car, corridor(3), Some(corridor(9)));

    walker.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(walker.nav_state(), Some(NavState::AvoidingCollision));
    assert_eq!(walker.coord(), Coord::new(3, 4));
}

#[test]
fn test_decide_priorities() {
    let mut world = corridor_static(&[]);
    let mut car = place(&mut world, 0, AgentKind::Car, corridor(0), Some(corridor(9)));
    let other = (AgentId(SimId(7)), AgentKind::Car);

    let clear = Perception {
        on_surface: true,
        surface_direction: Some(Direction::Right),
        next: Some(corridor(1)),
        next_has_surface: true,
        next_is_destination: false,
        agents_ahead: Vec::new(),
        signal_ahead: None,
    };
    assert_eq!(car.decide(&clear), Action::Move);

    let off_road = Perception {
        on_surface: false,
        ..clear.clone()
    };
    assert_eq!(car.decide(&off_road), Action::Wait);
    assert_eq!(car.nav_state(), Some(NavState::Blocked));

    // Blocked wins over a red light, red wins over traffic ahead
    let wall = Perception {
        next_has_surface: false,
        signal_ahead: Some(false),
        ..clear.clone()
    };
    assert_eq!(car.decide(&wall), Action::Wait);
    assert_eq!(car.nav_state(), Some(NavState::Blocked));

    let red_and_busy = Perception {
        signal_ahead: Some(false),
        agents_ahead: vec![other],
        ..clear.clone()
    };
    assert_eq!(car.decide(&red_and_busy), Action::Wait);
    assert_eq!(car.nav_state(), Some(NavState::WaitingOnSignal));

    let green_and_busy = Perception {
        signal_ahead: Some(true),
        agents_ahead: vec![other],
        ..clear.clone()
    };
    assert_eq!(car.decide(&green_and_busy), Action::Wait);
    assert_eq!(car.nav_state(), Some(NavState::AvoidingCollision));

    // The destination is enterable even without a surface
    let destination_ahead = Perception {
        next_has_surface: false,
        next_is_destination: true,
        ..clear
    };
    assert_eq!(car.decide(&destination_ahead), Action::Move);
    assert_eq!(car.nav_state(), Some(NavState::Moving));
}

#[test]
fn test_state_description() {
    let mut world = corridor_static(&[]);
    let mut rear = place(&mut world, 0, AgentKind::Car, corridor(0), Some(corridor(9)));
    let _lead = place(&mut world, 1, AgentKind::Car, corridor(1), Some(corridor(9)));

    assert_eq!(rear.state().to_string(), "ACTIVE -> moving");
    rear.step(&mut world.grid, &world.lights).expect("step");
    assert_eq!(rear.state().to_string(), "ACTIVE -> avoiding");
}

#[test]
fn test_pedestrian_heading_comes_from_crossing() {
    // The road under the crossing is placed first and heads Right
    let mut entities = common::corridor_entities(Some(corridor(9)));
    entities.push(StaticEntitySpec::pedestrian_walk(corridor(3), Direction::Up));
    entities.push(StaticEntitySpec::sidewalk(Coord::new(3, 6), Direction::Up));
    let mut world = city_traffic::simulation::build_world(10, 10, &entities).expect("builds");

    let walker = place(&mut world, 0, AgentKind::Pedestrian, corridor(3), None);
    let perception = walker.perceive(&world.grid, &world.lights);
    assert!(perception.on_surface);
    assert_eq!(perception.surface_direction, Some(Direction::Up));
    assert_eq!(perception.next, Some(Coord::new(3, 6)));
    assert!(perception.next_has_surface);

    let car = place(&mut world, 1, AgentKind::Car, corridor(2), None);
    let perception = car.perceive(&world.grid, &world.lights);
    assert_eq!(perception.surface_direction, Some(Direction::Right));
}
