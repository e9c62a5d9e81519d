// Runs as its own binary so the process-wide context is still unset.

use std::sync::Arc;

use num_complex::Complex64;

use fockspace::phase_space::{linspace, wigner_function};
use fockspace::quantum::{NumericContext, QuantumState};
use fockspace::ContextConfig;

#[test]
fn test_global_context_installed_before_first_use() {
    let config = ContextConfig::default()
        .with_tolerance(1e-6)
        .with_parallel(false);
    let installed = NumericContext::init_global(config.clone()).unwrap();

    let global = NumericContext::global();
    assert!(Arc::ptr_eq(&installed, &global));
    assert_eq!(global.config(), &config);
    assert_eq!(global.tolerance(), 1e-6);

    let mut state = QuantumState::from_raw_buffer(vec![
        Complex64::new(1.0 + 1e-8, 0.0),
        Complex64::new(0.0, 0.0),
    ]);
    state.initialize(&[2]).unwrap();
    assert!(Arc::ptr_eq(state.context(), &installed));
    assert!(state.as_state_vector().unwrap().is_normalized());

    let x = linspace(-1.0, 1.0, 3);
    assert!(wigner_function(&state, x.view(), x.view()).is_ok());

    let second = NumericContext::init_global(ContextConfig::default());
    match second {
        Err(existing) => assert!(Arc::ptr_eq(&existing, &installed)),
        Ok(_) => panic!("global context was installed twice"),
    }
}
