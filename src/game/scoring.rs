use crate::player::PlayerModel;

/// Points awarded for one answer event: full points on a direct correct
/// answer, half (rounded) on a correct steal, zero on anything wrong.
pub fn points_earned(question_points: u32, is_correct: bool, is_steal: bool) -> u32 {
    if !is_correct {
        return 0;
    }
    if is_steal {
        // round(points / 2)
        (question_points + 1) / 2
    } else {
        question_points
    }
}

/// Applies one real answer to a player's counters: exactly one of the
/// correct/wrong counters moves, and the score moves by `earned`.
pub fn apply_answer(player: &mut PlayerModel, is_correct: bool, earned: u32) {
    player.score += earned;
    if is_correct {
        player.correct_answers += 1;
    } else {
        player.wrong_answers += 1;
    }
}

/// A timeout is a skip: no answer record, no score change.
pub fn apply_skip(player: &mut PlayerModel) {
    player.skipped_answers += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerIdentity;
    use rstest::rstest;

    #[rstest]
    #[case(10, true, false, 10)]
    #[case(10, true, true, 5)]
    #[case(15, true, true, 8)] // round(7.5) = 8
    #[case(10, false, false, 0)]
    #[case(10, false, true, 0)]
    #[case(0, true, false, 0)]
    fn scoring_formula(
        #[case] points: u32,
        #[case] correct: bool,
        #[case] steal: bool,
        #[case] expected: u32,
    ) {
        assert_eq!(points_earned(points, correct, steal), expected);
    }

    fn player() -> PlayerModel {
        PlayerModel::new(
            "game".to_string(),
            PlayerIdentity::Guest {
                name: "Ada".to_string(),
            },
            1,
        )
    }

    #[test]
    fn correct_answer_moves_exactly_one_counter() {
        let mut p = player();
        apply_answer(&mut p, true, 10);
        assert_eq!(p.score, 10);
        assert_eq!(p.correct_answers, 1);
        assert_eq!(p.wrong_answers, 0);
        assert_eq!(p.skipped_answers, 0);
    }

    #[test]
    fn wrong_answer_moves_exactly_one_counter() {
        let mut p = player();
        apply_answer(&mut p, false, 0);
        assert_eq!(p.score, 0);
        assert_eq!(p.correct_answers, 0);
        assert_eq!(p.wrong_answers, 1);
    }

    #[test]
    fn skip_touches_only_the_skip_counter() {
        let mut p = player();
        apply_skip(&mut p);
        assert_eq!(p.score, 0);
        assert_eq!(p.correct_answers, 0);
        assert_eq!(p.wrong_answers, 0);
        assert_eq!(p.skipped_answers, 1);
    }
}
