use std::time::Duration;

use eyre::Result;
use regswitch_registry::{ProbeResult, Prober, RegistryManager, ReqwestProbe};

use super::lenient;
use crate::config::ProbeConfig;
use crate::utils::{current_marker, format_row, name_width};

/// Handle the test command - show response time for one or all registries
pub async fn handle_test_command(
    name: Option<String>,
    config: &ProbeConfig,
    manager: &RegistryManager,
) -> Result<()> {
    let entries = match name {
        Some(name) => match lenient(manager.find(&name).await)? {
            Some(entry) => vec![entry],
            None => return Ok(()),
        },
        None => manager.registries().await?,
    };

    let probe = ReqwestProbe::new(config.timeout_secs.map(Duration::from_secs))?;
    let results = Prober::new(probe)
        .with_path(config.path.clone())
        .run(&entries)
        .await;

    let live = manager.current_url().await?;
    println!();
    for row in result_rows(&results, &live) {
        println!("{}", row);
    }
    println!();
    Ok(())
}

fn result_rows(results: &[ProbeResult], live: &str) -> Vec<String> {
    let width = name_width(results.iter().map(|r| r.name.as_str()));
    results
        .iter()
        .map(|result| {
            let outcome = if result.failed {
                "Fetch Error".to_string()
            } else {
                format!("{}ms", result.elapsed_ms)
            };
            format_row(
                current_marker(&result.registry, live),
                &result.name,
                width,
                &outcome,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_print_fetch_error() {
        let results = vec![
            ProbeResult {
                name: "npm".to_string(),
                registry: "https://registry.npmjs.org/".to_string(),
                elapsed_ms: 120,
                failed: false,
            },
            ProbeResult {
                name: "down".to_string(),
                registry: "https://down.example/".to_string(),
                elapsed_ms: 3,
                failed: true,
            },
        ];

        assert_eq!(
            result_rows(&results, "https://registry.npmjs.org/"),
            vec!["* npm ---- 120ms", "  down --- Fetch Error"]
        );
    }
}
