#![no_main]

use arbitrary::Arbitrary;
use blockpi_core::{CounterRegistry, Delta};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Input {
    Integer(i64),
    Numeric(f64),
    Flag(bool),
    Text(String),
}

fuzz_target!(|inputs: Vec<Input>| {
    let registry = CounterRegistry::new();
    let counter = registry.get_or_create("fuzz");
    let mut expected = 0i64;

    for input in inputs {
        let delta = match input {
            Input::Integer(n) => Delta::Integer(n),
            Input::Numeric(n) => Delta::Numeric(n),
            Input::Flag(b) => Delta::Flag(b),
            Input::Text(s) => Delta::Text(s),
        };
        let resolved = delta.resolve();
        match &delta {
            Delta::Flag(b) => assert_eq!(resolved, i64::from(*b)),
            Delta::Integer(n) => assert_eq!(resolved, *n),
            _ => {}
        }
        expected = expected.wrapping_add(resolved);
        assert_eq!(counter.add(delta), expected);
    }
});
