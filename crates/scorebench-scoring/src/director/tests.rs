//! Tests for the reference score directors.

use super::*;
use scorebench_core::{PlanningSolution, SimpleScore};
use scorebench_test::toggle::{
    calculate_toggle_score, create_toggle_descriptor, set_state, ToggleSolution,
};
use scorebench_test::workshop::{
    calculate_workshop_score, create_workshop, create_workshop_descriptor, set_slot,
    SESSION_DESCRIPTOR,
};

// Counts switches that are on, one switch at a time.
#[derive(Default)]
struct ToggleCalculator {
    on: i64,
    unassigned: i64,
    constraint_match_enabled: bool,
}

impl ToggleCalculator {
    fn contribution(state: Option<usize>) -> (i64, i64) {
        match state {
            Some(1) => (1, 0),
            Some(_) => (0, 0),
            None => (0, 1),
        }
    }
}

impl IncrementalScoreCalculator<ToggleSolution> for ToggleCalculator {
    fn reset_working_solution(&mut self, solution: &ToggleSolution, constraint_match_enabled: bool) {
        self.on = 0;
        self.unassigned = 0;
        self.constraint_match_enabled = constraint_match_enabled;
        for state in &solution.states {
            let (on, unassigned) = Self::contribution(*state);
            self.on += on;
            self.unassigned += unassigned;
        }
    }

    fn before_variable_changed(&mut self, solution: &ToggleSolution, _: usize, i: usize, _: &str) {
        let (on, unassigned) = Self::contribution(solution.states[i]);
        self.on -= on;
        self.unassigned -= unassigned;
    }

    fn after_variable_changed(&mut self, solution: &ToggleSolution, _: usize, i: usize, _: &str) {
        let (on, unassigned) = Self::contribution(solution.states[i]);
        self.on += on;
        self.unassigned += unassigned;
    }

    fn calculate_score(&mut self) -> SimpleScore {
        SimpleScore::of(self.on - self.unassigned)
    }

    fn constraint_match_totals(&self) -> Vec<ConstraintMatchTotal<SimpleScore>> {
        if !self.constraint_match_enabled {
            return Vec::new();
        }
        vec![
            ConstraintMatchTotal::new("Switched on", self.on as usize, SimpleScore::of(self.on)),
            ConstraintMatchTotal::new(
                "Unassigned switch",
                self.unassigned as usize,
                SimpleScore::of(-self.unassigned),
            ),
        ]
    }
}

fn change_state<D: ScoreDirector<ToggleSolution>>(director: &mut D, i: usize, v: Option<usize>) {
    director.before_variable_changed(0, i, "state");
    set_state(director.working_solution_mut(), i, v);
    director.after_variable_changed(0, i, "state");
}

fn easy_toggle_factory() -> EasyScoreDirectorFactory<ToggleSolution, fn(&ToggleSolution) -> SimpleScore> {
    EasyScoreDirectorFactory::new(
        create_toggle_descriptor(),
        calculate_toggle_score as fn(&ToggleSolution) -> SimpleScore,
    )
}

#[test]
fn test_easy_director_calculates_and_stores_score() {
    let mut director = easy_toggle_factory().build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(ToggleSolution::new(vec![Some(1), Some(0), Some(1)]));

    let score = director.calculate_score();

    assert_eq!(score, SimpleScore::of(2));
    assert_eq!(director.working_solution().score(), Some(score));
    assert!(!director.is_incremental());
    assert!(director.constraint_match_totals().is_none());
}

#[test]
fn test_easy_director_caches_until_a_change() {
    let mut director = easy_toggle_factory().build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(ToggleSolution::new(vec![Some(0), Some(0)]));

    director.calculate_score();
    director.calculate_score();
    assert_eq!(director.calculation_count(), 1);

    change_state(&mut director, 1, Some(1));
    assert_eq!(director.calculate_score(), SimpleScore::of(1));
    assert_eq!(director.calculation_count(), 2);
}

#[test]
fn test_easy_director_close_releases_solution() {
    let mut director = easy_toggle_factory().build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(ToggleSolution::single(0));
    assert!(!director.is_closed());

    director.close();

    assert!(director.is_closed());
}

#[test]
#[should_panic(expected = "used after close()")]
fn test_easy_director_panics_after_close() {
    let mut director = easy_toggle_factory().build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(ToggleSolution::single(0));
    director.close();

    director.calculate_score();
}

#[test]
#[should_panic(expected = "no working solution")]
fn test_easy_director_panics_without_solution() {
    let director = easy_toggle_factory().build_score_director(ScoreDirectorFlags::default());
    let _ = director.working_solution();
}

#[test]
fn test_easy_director_workshop_score() {
    let director_factory =
        EasyScoreDirectorFactory::new(create_workshop_descriptor(), calculate_workshop_score);
    let mut director = director_factory.build_score_director(ScoreDirectorFlags::default());
    // Sessions 0 and 2 share slot 0 and room 0.
    director.set_working_solution(create_workshop(3, 3, 2, 2));

    assert_eq!(director.calculate_score(), SimpleScore::of(-2));

    director.before_variable_changed(SESSION_DESCRIPTOR, 2, "slot");
    set_slot(director.working_solution_mut(), 2, Some(1));
    director.after_variable_changed(SESSION_DESCRIPTOR, 2, "slot");

    // Now sessions 1 and 2 share slot 1 and room 0.
    assert_eq!(director.calculate_score(), SimpleScore::of(-2));
    assert_eq!(
        director.solution_descriptor().type_name(),
        "WorkshopSolution"
    );
}

#[test]
fn test_incremental_director_matches_full_calculation() {
    let director_factory =
        IncrementalScoreDirectorFactory::new(create_toggle_descriptor(), ToggleCalculator::default);
    let mut director = director_factory.build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(ToggleSolution::new(vec![Some(0), None, Some(1), Some(0)]));

    assert_eq!(director.calculate_score(), SimpleScore::of(0));

    let changes = [(1, Some(1)), (3, Some(1)), (2, Some(0)), (0, None), (0, Some(1))];
    for (i, v) in changes {
        change_state(&mut director, i, v);
        let expected = calculate_toggle_score(director.working_solution());
        assert_eq!(director.calculate_score(), expected);
    }
    assert!(director.is_incremental());
    assert_eq!(director.calculation_count(), 6);
}

#[test]
fn test_incremental_director_resets_on_new_solution() {
    let director_factory =
        IncrementalScoreDirectorFactory::new(create_toggle_descriptor(), ToggleCalculator::default);
    let mut director = director_factory.build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(ToggleSolution::new(vec![Some(1), Some(1)]));
    assert_eq!(director.calculate_score(), SimpleScore::of(2));

    director.set_working_solution(ToggleSolution::new(vec![None]));

    assert_eq!(director.calculate_score(), SimpleScore::of(-1));
}

#[test]
fn test_incremental_director_constraint_matches_follow_flags() {
    let director_factory =
        IncrementalScoreDirectorFactory::new(create_toggle_descriptor(), ToggleCalculator::default);

    let mut plain = director_factory.build_score_director(ScoreDirectorFlags::default());
    plain.set_working_solution(ToggleSolution::new(vec![Some(1)]));
    assert!(plain.constraint_match_totals().is_none());
    assert!(!plain.is_constraint_match_enabled());

    let mut justified = director_factory
        .build_score_director(ScoreDirectorFlags::default().with_constraint_match(true));
    justified.set_working_solution(ToggleSolution::new(vec![Some(1), None, Some(1)]));
    let totals = justified.constraint_match_totals().unwrap();

    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].constraint_name, "Switched on");
    assert_eq!(totals[0].match_count, 2);
    assert_eq!(totals[1].score, SimpleScore::of(-1));

    justified.close();
    assert!(justified.constraint_match_totals().is_none());
}

#[test]
fn test_factory_builds_independent_directors() {
    let director_factory =
        IncrementalScoreDirectorFactory::new(create_toggle_descriptor(), ToggleCalculator::default);
    let original = ToggleSolution::new(vec![Some(0), Some(0)]);

    let mut first = director_factory.build_score_director(ScoreDirectorFlags::default());
    first.set_working_solution(first.clone_solution(&original));
    change_state(&mut first, 0, Some(1));
    first.calculate_score();

    let mut second = director_factory.build_score_director(ScoreDirectorFlags::default());
    second.set_working_solution(second.clone_solution(&original));

    assert_eq!(second.calculate_score(), SimpleScore::of(0));
    assert_eq!(original.states, vec![Some(0), Some(0)]);
    assert_eq!(director_factory.solution_descriptor().genuine_variable_count(), 1);
}

// Relay runners: leaders pick a lane, each follower runs in its leader's lane.
#[derive(Clone, Debug, PartialEq)]
struct RelaySolution {
    leader_lanes: Vec<Option<usize>>,
    follower_leaders: Vec<usize>,
    follower_lanes: Vec<Option<usize>>,
    score: Option<SimpleScore>,
}

const LEADER_DESCRIPTOR: usize = 0;
const FOLLOWER_DESCRIPTOR: usize = 1;

impl PlanningSolution for RelaySolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

impl ShadowVariableSupport for RelaySolution {
    fn shadow_variables(&self, out: &mut Vec<ShadowVariableRef>) {
        out.extend(
            (0..self.follower_lanes.len())
                .map(|i| ShadowVariableRef::new(FOLLOWER_DESCRIPTOR, i, "lane")),
        );
    }

    fn shadow_dependents(
        &self,
        descriptor_index: usize,
        entity_index: usize,
        _variable_name: &str,
        out: &mut Vec<ShadowVariableRef>,
    ) {
        if descriptor_index != LEADER_DESCRIPTOR {
            return;
        }
        for (i, &leader) in self.follower_leaders.iter().enumerate() {
            if leader == entity_index {
                out.push(ShadowVariableRef::new(FOLLOWER_DESCRIPTOR, i, "lane"));
            }
        }
    }

    fn update_shadow(&mut self, shadow: ShadowVariableRef) {
        let leader = self.follower_leaders[shadow.entity_index];
        self.follower_lanes[shadow.entity_index] = self.leader_lanes[leader];
    }
}

fn relay_descriptor() -> scorebench_core::SolutionDescriptor<RelaySolution> {
    use scorebench_core::{EntityDescriptor, SolutionDescriptor, VariableDescriptor};

    fn get_lane(s: &RelaySolution, i: usize) -> Option<usize> {
        s.leader_lanes[i]
    }
    fn set_lane(s: &mut RelaySolution, i: usize, v: Option<usize>) {
        s.leader_lanes[i] = v;
    }

    SolutionDescriptor::new("RelaySolution")
        .with_entity(
            EntityDescriptor::new("Leader", |s: &RelaySolution| s.leader_lanes.len())
                .with_variable(VariableDescriptor::new("lane", get_lane, set_lane, |_: &RelaySolution| 2)),
        )
        .with_entity(EntityDescriptor::new("Follower", |s: &RelaySolution| {
            s.follower_lanes.len()
        }))
}

// Minus one per runner in lane 1.
fn relay_score(s: &RelaySolution) -> SimpleScore {
    let crowded = s
        .leader_lanes
        .iter()
        .chain(&s.follower_lanes)
        .filter(|lane| **lane == Some(1))
        .count();
    SimpleScore::of(-(crowded as i64))
}

#[derive(Default)]
struct RelayCalculator {
    crowded: i64,
}

impl RelayCalculator {
    fn lane(solution: &RelaySolution, descriptor_index: usize, i: usize) -> Option<usize> {
        match descriptor_index {
            LEADER_DESCRIPTOR => solution.leader_lanes[i],
            _ => solution.follower_lanes[i],
        }
    }
}

impl IncrementalScoreCalculator<RelaySolution> for RelayCalculator {
    fn reset_working_solution(&mut self, solution: &RelaySolution, _: bool) {
        self.crowded = -relay_score(solution).score();
    }

    fn before_variable_changed(&mut self, solution: &RelaySolution, d: usize, i: usize, _: &str) {
        if Self::lane(solution, d, i) == Some(1) {
            self.crowded -= 1;
        }
    }

    fn after_variable_changed(&mut self, solution: &RelaySolution, d: usize, i: usize, _: &str) {
        if Self::lane(solution, d, i) == Some(1) {
            self.crowded += 1;
        }
    }

    fn calculate_score(&mut self) -> SimpleScore {
        SimpleScore::of(-self.crowded)
    }
}

fn create_relay() -> RelaySolution {
    RelaySolution {
        leader_lanes: vec![Some(0), Some(1)],
        follower_leaders: vec![0, 0, 1],
        // Left stale on purpose; the listeners derive them.
        follower_lanes: vec![None, None, None],
        score: None,
    }
}

fn change_lane<D: ScoreDirector<RelaySolution>>(director: &mut D, i: usize, v: Option<usize>) {
    director.before_variable_changed(LEADER_DESCRIPTOR, i, "lane");
    director.working_solution_mut().leader_lanes[i] = v;
    director.after_variable_changed(LEADER_DESCRIPTOR, i, "lane");
    director.trigger_variable_listeners();
}

#[test]
fn test_shadow_aware_director_derives_shadows_on_trigger() {
    let director_factory = ShadowAwareScoreDirectorFactory::new(
        IncrementalScoreDirectorFactory::new(relay_descriptor(), RelayCalculator::default),
    );
    let mut director = director_factory.build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(create_relay());
    assert_eq!(director.pending_shadow_count(), 3);

    director.trigger_variable_listeners();

    assert_eq!(director.pending_shadow_count(), 0);
    assert_eq!(director.shadow_update_count(), 3);
    assert_eq!(
        director.working_solution().follower_lanes,
        vec![Some(0), Some(0), Some(1)]
    );
    assert_eq!(director.calculate_score(), SimpleScore::of(-2));
}

#[test]
fn test_shadow_follows_its_source_through_changes() {
    let director_factory = ShadowAwareScoreDirectorFactory::new(
        IncrementalScoreDirectorFactory::new(relay_descriptor(), RelayCalculator::default),
    );
    let mut director = director_factory.build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(create_relay());
    director.trigger_variable_listeners();

    change_lane(&mut director, 0, Some(1));
    assert_eq!(
        director.working_solution().follower_lanes,
        vec![Some(1), Some(1), Some(1)]
    );
    assert_eq!(director.calculate_score(), SimpleScore::of(-5));
    assert_eq!(director.shadow_update_count(), 5);

    change_lane(&mut director, 0, Some(0));
    assert_eq!(
        director.working_solution().follower_lanes,
        vec![Some(0), Some(0), Some(1)]
    );
    assert_eq!(director.calculate_score(), SimpleScore::of(-2));
}

#[test]
fn test_shadow_aware_easy_and_incremental_agree() {
    let mut easy = ShadowAwareScoreDirectorFactory::new(EasyScoreDirectorFactory::new(
        relay_descriptor(),
        relay_score as fn(&RelaySolution) -> SimpleScore,
    ))
    .build_score_director(ScoreDirectorFlags::default());
    let mut incremental = ShadowAwareScoreDirectorFactory::new(
        IncrementalScoreDirectorFactory::new(relay_descriptor(), RelayCalculator::default),
    )
    .build_score_director(ScoreDirectorFlags::default());

    easy.set_working_solution(create_relay());
    easy.trigger_variable_listeners();
    incremental.set_working_solution(create_relay());
    incremental.trigger_variable_listeners();

    let changes = [(1, Some(0)), (0, Some(1)), (1, None), (0, Some(0)), (1, Some(1))];
    for (i, v) in changes {
        change_lane(&mut easy, i, v);
        change_lane(&mut incremental, i, v);
        assert_eq!(easy.calculate_score(), incremental.calculate_score());
        assert_eq!(
            easy.working_solution().follower_lanes,
            incremental.working_solution().follower_lanes
        );
    }
    assert!(incremental.is_incremental());
    assert!(!easy.is_incremental());
}

#[test]
fn test_shadow_aware_director_close_drops_pending_shadows() {
    let mut director = ShadowAwareScoreDirectorFactory::new(
        IncrementalScoreDirectorFactory::new(relay_descriptor(), RelayCalculator::default),
    )
    .build_score_director(ScoreDirectorFlags::default());
    director.set_working_solution(create_relay());

    director.close();

    assert!(director.is_closed());
    assert!(director.inner().is_closed());
    assert_eq!(director.pending_shadow_count(), 0);
}
