//! Law and property tests.
//!
//! Architectural results must be independent of the microarchitecture: the
//! same program retires the same values at every superscalar width, loops
//! survive prediction and flush at any trip count, and `div` follows the
//! locked floor-division semantics for arbitrary operands.

mod common;

use common::*;
use proptest::prelude::*;
use rstest::rstest;

use mipsim_core::Program;

/// Sum 1..=n with a backward `bgtz` loop.
///
/// ```text
/// 32:    addi $t0, $zero, n
/// 36: L: add  $v0, $v0, $t0
/// 40:    addi $t0, $t0, -1
/// 44:    bgtz $t0, L          # (36 - 44) / 4 = -2
/// ```
fn countdown_sum(n: i16) -> Vec<u32> {
    vec![addi(8, 0, n), add(2, 2, 8), addi(8, 8, -1), bgtz(8, -2)]
}

/// Sum 1..=n with a forward `blez` exit and a backward jump.
///
/// ```text
/// 32:    addi $t0, $zero, n
/// 36: L: blez $t0, END        # (52 - 36) / 4 = 4
/// 40:    add  $v0, $v0, $t0
/// 44:    addi $t0, $t0, -1
/// 48:    j    L
/// 52: END:
/// ```
fn blez_sum(n: i16) -> Vec<u32> {
    vec![addi(8, 0, n), blez(8, 4), add(2, 2, 8), addi(8, 8, -1), j(36)]
}

fn triangle(n: i32) -> i32 {
    n * (n + 1) / 2
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[case(8)]
fn loop_sum_is_independent_of_width(#[case] width: usize) {
    let sim = run(&countdown_sum(10), width);
    assert_eq!(sim.return_values().0, triangle(10), "width {width}");
}

#[rstest]
#[case(1)]
#[case(4)]
fn blez_terminated_loop_sums_at_any_width(#[case] width: usize) {
    let sim = run(&blez_sum(7), width);
    assert_eq!(sim.return_values().0, triangle(7));
}

proptest! {
    #[test]
    fn countdown_sum_matches_the_closed_form(n in 1i16..32) {
        let sim = run(&countdown_sum(n), 4);
        prop_assert_eq!(sim.return_values().0, triangle(i32::from(n)));
    }

    #[test]
    fn blez_sum_matches_the_closed_form(n in 0i16..24) {
        let sim = run(&blez_sum(n), 4);
        prop_assert_eq!(sim.return_values().0, triangle(i32::from(n)));
    }

    /// Floor-division reference: quotient toward negative infinity,
    /// remainder with the divisor's sign, computed wide and wrapped.
    #[test]
    fn div_follows_floor_semantics(a in any::<i32>(), b in any::<i32>()) {
        prop_assume!(b != 0);
        let (wide_a, wide_b) = (i64::from(a), i64::from(b));
        let mut q = wide_a / wide_b;
        let mut r = wide_a % wide_b;
        if r != 0 && (r < 0) != (wide_b < 0) {
            q -= 1;
            r += wide_b;
        }

        let mut words = Vec::new();
        words.extend(load_constant(8, a));
        words.extend(load_constant(9, b));
        words.extend([div(8, 9), mflo(2), mfhi(3)]);
        let sim = run(&words, 4);
        prop_assert_eq!(sim.return_values(), (q as i32, r as i32));
    }

    /// The program file round-trips losslessly through its serialized form.
    #[test]
    fn program_serialization_round_trips(
        memory in prop::collection::btree_map(any::<u32>(), any::<u8>(), 0..64),
        entry in any::<u32>(),
    ) {
        let program = Program { memory, entry };
        let encoded = serde_json::to_string(&program).unwrap();
        let decoded: Program = serde_json::from_str(&encoded).unwrap();
        prop_assert_eq!(decoded, program);
    }
}
