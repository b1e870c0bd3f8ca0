use std::backtrace::Backtrace;

use crate::events::Frame;

/// Renders the calling thread's stack as text, regardless of `RUST_BACKTRACE`.
pub fn capture_stack() -> String {
    Backtrace::force_capture().to_string()
}

pub fn stack_lines(stack: &str) -> Vec<String> {
    stack.lines().map(str::to_string).collect()
}

/// One frame per stack line; the line is kept verbatim in `abs_path`.
// TODO: split `at file:line:col` lines into filename/lineno once the wire
// consumers accept structured frames.
pub fn frames_from_stack(stack: &str) -> Vec<Frame> {
    stack
        .lines()
        .map(|line| Frame {
            abs_path: line.to_string(),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_keep_lines_verbatim() {
        let stack = "   0: raven::main\n             at ./src/main.rs:4:5\n";
        let frames = frames_from_stack(stack);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].abs_path, "   0: raven::main");
        assert_eq!(frames[1].abs_path, "             at ./src/main.rs:4:5");
        assert!(frames[1].filename.is_empty());
        assert!(frames[1].lineno.is_empty());
    }

    #[test]
    fn test_empty_stack_has_no_frames() {
        assert!(frames_from_stack("").is_empty());
        assert!(stack_lines("").is_empty());
    }

    #[test]
    fn test_capture_stack_is_not_empty() {
        let stack = capture_stack();
        assert!(!stack.is_empty());
        assert_eq!(frames_from_stack(&stack).len(), stack_lines(&stack).len());
    }
}
