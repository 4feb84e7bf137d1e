//! Assemble-then-simulate round trips.
//!
//! Each test assembles real two-section source text and runs the resulting
//! program image on the simulator, checking the architectural results the
//! source promises.

use mipsim_core::{Config, Simulator};

/// Assembles source and runs it to termination at width 4.
fn assemble_and_run(source: &str) -> Simulator {
    let program = mipsim_asm::assemble(source).expect("assembly failed");
    let mut sim = Simulator::new(program, &Config::default());
    loop {
        sim.tick().expect("simulation fault");
        if sim.finished() {
            return sim;
        }
        assert!(sim.stats().cycles < 100_000, "program did not terminate");
    }
}

#[test]
fn sum_of_two_constants_returns_through_v0() {
    // $ra is 0, so `jr $ra` leaves the loaded image and terminates.
    let sim = assemble_and_run(
        "\
.text
main:
addi $t0, $zero, 29
addi $t1, $zero, 13
add $v0, $t0, $t1
jr $ra
",
    );
    assert_eq!(sim.return_values().0, 42);
}

#[test]
fn data_words_load_by_label() {
    let sim = assemble_and_run(
        "\
.data
x: .word 42
.text
main:
lw $v0, x
",
    );
    assert_eq!(sim.return_values().0, 42);
}

#[test]
fn countdown_loop_predicts_all_but_the_exit() {
    let sim = assemble_and_run(
        "\
.text
main:
addi $t0, $zero, 10
L: addi $t0, $t0, -1
bne $t0, $zero, L
add $v0, $zero, $zero
",
    );
    assert_eq!(sim.return_values().0, 0);
    let bp = sim.predictor();
    assert_eq!(bp.incorrect_predictions(), 1);
    assert!(bp.total_predictions() - bp.incorrect_predictions() >= 8);
}

#[test]
fn call_and_return_never_enter_recovery() {
    let sim = assemble_and_run(
        "\
.text
main:
jal F
j END
F: addi $v0, $zero, 1
jr $ra
END: nop
",
    );
    assert_eq!(sim.return_values().0, 1);
    assert_eq!(sim.stats().flushes, 0, "the RAS predicts the return exactly");
}

#[test]
fn stack_stores_survive_to_the_dump() {
    // The load addresses through a copy of $sp so it becomes ready with
    // the store and the single LSU port issues them in program order.
    let sim = assemble_and_run(
        "\
.text
main:
addi $t0, $zero, 77    # value to spill
add $t1, $sp, $zero
sw $t0, -4($sp)
lw $v0, -4($t1)
",
    );
    assert_eq!(sim.return_values().0, 77);
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let sim = assemble_and_run(
        "\
# a full-line comment
.text

main:
addi $v0, $zero, 5 # trailing comment
",
    );
    assert_eq!(sim.return_values().0, 5);
}
