//! # Pavement Design CLI
//!
//! Terminal front-end for the pavement design engine: loads a project JSON
//! from argv (or runs the built-in reference structure when no path is
//! given), solves the mechanical response, evaluates the fatigue
//! verifications and prints a pass/fail table plus a JSON dump of the
//! results.

use std::env;
use std::fs;
use std::process::ExitCode;

use pave_core::fatigue::{check_layer, AdmissibleCheck, FatigueCriterion};
use pave_core::project::Project;
use pave_core::response::dispatcher::ResponseDispatcher;
use pave_core::response::ResponseSet;

fn main() -> ExitCode {
    println!("Pavement Design Engine - NF P98-086 verification");
    println!("================================================");
    println!();

    let project = match load_project() {
        Ok(project) => project,
        Err(message) => {
            eprintln!("Error: {}", message);
            return ExitCode::FAILURE;
        }
    };

    println!("Project:  {}", project.meta.name);
    println!("Layers:   {}", project.structure.layers.len());
    println!(
        "Traffic:  MJA {:.0}, {} years, NE = {:.0}",
        project.traffic.mja,
        project.traffic.duration_years,
        project.traffic.ne_total()
    );
    println!();

    // No native library is bound in the terminal front-end; the dispatcher
    // degrades to the analytical fallback when rigorous mode is requested.
    let dispatcher = ResponseDispatcher::new();
    let result = match dispatcher.solve(&project.structure, project.settings.mode) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            return ExitCode::FAILURE;
        }
    };

    print_responses(&result);
    let checks = run_verifications(&project, &result);
    let all_pass = print_verdicts(&checks);

    println!();
    println!("JSON Output:");
    if let Ok(json) = serde_json::to_string_pretty(&result) {
        println!("{}", json);
    }

    if all_pass {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn load_project() -> Result<Project, String> {
    match env::args().nth(1) {
        Some(path) => {
            let text = fs::read_to_string(&path)
                .map_err(|e| format!("cannot read {}: {}", path, e))?;
            serde_json::from_str(&text).map_err(|e| format!("invalid project file {}: {}", path, e))
        }
        None => {
            println!("No project file given; running the built-in reference structure.");
            println!();
            Ok(Project::reference_demo())
        }
    }
}

fn print_responses(result: &ResponseSet) {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  MECHANICAL RESPONSE ({:?})", result.backend);
    if result.degraded {
        println!("  degraded: {}", result.message);
    }
    println!("═══════════════════════════════════════════════════════════════");
    println!(
        "  {:<5} {:<9} {:>9} {:>9} {:>9} {:>9} {:>8}",
        "Layer", "Role", "σt MPa", "εt µdef", "σz MPa", "εz µdef", "w mm"
    );
    for layer in &result.layers {
        println!(
            "  {:<5} {:<9} {:>9.3} {:>9.1} {:>9.3} {:>9.1} {:>8.2}",
            layer.layer_index,
            format!("{:?}", layer.role),
            layer.sigma_t_top,
            layer.epsilon_t_top,
            layer.sigma_z_top,
            layer.epsilon_z_top,
            layer.deflection_top,
        );
        if layer.deflection_bottom != 0.0 || layer.sigma_z_bottom != 0.0 {
            println!(
                "  {:<5} {:<9} {:>9.3} {:>9.1} {:>9.3} {:>9.1} {:>8.2}",
                "",
                "(bottom)",
                layer.sigma_t_bottom,
                layer.epsilon_t_bottom,
                layer.sigma_z_bottom,
                layer.epsilon_z_bottom,
                layer.deflection_bottom,
            );
        }
    }
    println!();
}

fn run_verifications(project: &Project, result: &ResponseSet) -> Vec<AdmissibleCheck> {
    let mut checks = Vec::new();
    for setup in &project.verifications {
        let Some(response) = result.layers.get(setup.layer_index) else {
            eprintln!(
                "Warning: verification references layer {} which does not exist",
                setup.layer_index
            );
            continue;
        };
        let group = setup.resolved_group(&project.structure);
        let ne = setup.params.layer_ne(&project.traffic, group);
        checks.push(check_layer(response, &setup.params, ne));
    }
    checks
}

fn print_verdicts(checks: &[AdmissibleCheck]) -> bool {
    println!("═══════════════════════════════════════════════════════════════");
    println!("  FATIGUE VERIFICATION");
    println!("═══════════════════════════════════════════════════════════════");
    let mut all_pass = true;
    for check in checks {
        let unit = match check.criterion {
            FatigueCriterion::SigmaT => "MPa",
            _ => "µdef",
        };
        println!(
            "  Layer {} {:?}: computed {:.2} {} vs admissible {:.2} {} {}",
            check.layer_index,
            check.criterion,
            check.computed,
            unit,
            check.admissible,
            unit,
            status_icon(check.satisfied)
        );
        all_pass &= check.satisfied;
    }
    if checks.is_empty() {
        println!("  (no verifications configured)");
    }
    println!();
    println!(
        "  RESULT: {}",
        if all_pass { "PASS" } else { "FAIL" }
    );
    all_pass
}

fn status_icon(pass: bool) -> &'static str {
    if pass {
        "[OK]"
    } else {
        "[FAIL]"
    }
}
