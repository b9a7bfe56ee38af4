//! Assertion utilities for testing

/// Assert that a result is OK and unwrap it
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?}", err),
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match $expr {
            Ok(val) => val,
            Err(err) => panic!("Expected Ok, got Err: {:?} ({})", err, format!($($arg)+)),
        }
    };
}

/// Assert that a result is Err and unwrap the error
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?}", val),
            Err(err) => err,
        }
    };
    ($expr:expr, $($arg:tt)+) => {
        match $expr {
            Ok(val) => panic!("Expected Err, got Ok: {:?} ({})", val, format!($($arg)+)),
            Err(err) => err,
        }
    };
}

/// Assert the sequence of status labels a submission produced
#[macro_export]
macro_rules! assert_labels {
    ($statuses:expr, [$($label:expr),* $(,)?]) => {{
        let got: Vec<&str> = $statuses.iter().map(|s| s.label()).collect();
        let want: Vec<&str> = vec![$($label),*];
        assert_eq!(got, want, "unexpected submission status sequence");
    }};
}

/// Assert that every proxy sequence respects a depth bound
#[macro_export]
macro_rules! assert_depth_bounded {
    ($sequences:expr, $max:expr) => {
        for seq in $sequences.iter() {
            assert!(
                !seq.is_empty() && seq.len() <= $max,
                "sequence of length {} outside [1, {}]",
                seq.len(),
                $max
            );
        }
    };
}
