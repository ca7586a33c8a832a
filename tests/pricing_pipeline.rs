//! End-to-end tests for the price lookup pipeline, driven through real local
//! subprocesses (`sh`, `cat`) standing in for the model CLI.

use book_catalog::config::Pricing;
use book_catalog::pricing::{PriceError, PriceOracle};

fn oracle_for(program: &str, args: &[&str]) -> PriceOracle {
    PriceOracle::new(&Pricing {
        program: program.to_string(),
        args: args.iter().map(|a| a.to_string()).collect(),
        timeout_secs: 5,
        max_concurrent: 2,
        enabled: true,
    })
}

#[tokio::test]
async fn extracts_price_from_noisy_model_output() {
    // Cursor-hide escape, a braille spinner frame, then the answer.
    let oracle = oracle_for(
        "sh",
        &["-c", r"printf '\033[?25l\342\240\213 thinking\nPrice: $12.99\n\033[?25h'"],
    );
    let price = oracle.price_for("Dune", "Frank Herbert").await.unwrap();
    assert_eq!(price.as_deref(), Some("$12.99"));
}

#[tokio::test]
async fn answer_without_a_price_token_yields_none() {
    let oracle = oracle_for("sh", &["-c", "echo I dont know"]);
    let price = oracle.price_for("Dune", "Frank Herbert").await.unwrap();
    assert_eq!(price, None);
}

#[tokio::test]
async fn prompt_reaches_the_model_untouched() {
    // `cat` echoes its stdin; the prompt itself contains a price token, so
    // whatever comes back proves the exact bytes that were delivered.
    let oracle = oracle_for("cat", &[]);
    let price = oracle.price_for("Bargains for $3.50", "Anon").await.unwrap();
    assert_eq!(price.as_deref(), Some("$3.50"));
}

#[tokio::test]
async fn unstartable_program_is_a_bridge_error_not_a_panic() {
    let oracle = oracle_for("definitely-not-a-real-program-xyz", &[]);
    let err = oracle.price_for("Dune", "Frank Herbert").await.unwrap_err();
    assert!(matches!(err, PriceError::Bridge(_)), "got {err:?}");
}

#[tokio::test]
async fn failed_lookup_degrades_to_absent_price() {
    let oracle = oracle_for("definitely-not-a-real-program-xyz", &[]);
    assert_eq!(oracle.price_or_none("Dune", "Frank Herbert").await, None);
}

#[tokio::test]
async fn timed_out_lookup_degrades_to_absent_price() {
    let oracle = PriceOracle::new(&Pricing {
        program: "sleep".to_string(),
        args: vec!["30".to_string()],
        timeout_secs: 1,
        max_concurrent: 1,
        enabled: true,
    });
    assert_eq!(oracle.price_or_none("Dune", "Frank Herbert").await, None);
}

#[tokio::test]
async fn disabled_oracle_skips_the_subprocess_entirely() {
    // The program does not exist, but with pricing disabled it is never
    // spawned, so the lookup still succeeds with an absent price.
    let oracle = PriceOracle::new(&Pricing {
        program: "definitely-not-a-real-program-xyz".to_string(),
        args: vec![],
        timeout_secs: 5,
        max_concurrent: 1,
        enabled: false,
    });
    let price = oracle.price_for("Dune", "Frank Herbert").await.unwrap();
    assert_eq!(price, None);
}

#[tokio::test]
async fn concurrent_lookups_respect_the_ceiling() {
    // With a ceiling of 1 the two lookups serialize; both still complete.
    let oracle = std::sync::Arc::new(PriceOracle::new(&Pricing {
        program: "sh".to_string(),
        args: vec!["-c".to_string(), "echo '$5'".to_string()],
        timeout_secs: 5,
        max_concurrent: 1,
        enabled: true,
    }));

    let a = {
        let oracle = oracle.clone();
        tokio::spawn(async move { oracle.price_or_none("A", "A").await })
    };
    let b = {
        let oracle = oracle.clone();
        tokio::spawn(async move { oracle.price_or_none("B", "B").await })
    };

    assert_eq!(a.await.unwrap().as_deref(), Some("$5"));
    assert_eq!(b.await.unwrap().as_deref(), Some("$5"));
}
