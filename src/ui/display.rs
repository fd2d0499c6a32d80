//! Display functions for installed bundles

use console::Style;

use bms::domain::{InstalledBundleRecord, InstalledModule, OverlayState};

macro_rules! display_field {
    ($indent:expr, $label:expr, $value:expr) => {
        println!(
            "{}{} {}",
            $indent,
            Style::new().bold().apply_to($label),
            $value
        )
    };
}

/// Display bundle in simple format
pub fn display_bundle_simple(record: &InstalledBundleRecord) {
    println!(
        "  {} {}",
        Style::new().bold().yellow().apply_to(&record.bundle_name),
        Style::new()
            .dim()
            .apply_to(format!("{} ({})", record.version_name, record.version_code))
    );
    display_field!("    ", "Users:", user_list(record));
    display_field!("    ", "Modules:", record.modules.len());
}

/// Display bundle with its modules, overlay role and quick fix
pub fn display_bundle_detailed(record: &InstalledBundleRecord) {
    println!("  {}", Style::new().bold().yellow().apply_to(&record.bundle_name));
    display_field!(
        "    ",
        "Version:",
        format!("{} ({})", record.version_name, record.version_code)
    );
    display_field!(
        "    ",
        "Min compatible:",
        record.min_compatible_version_code
    );
    display_field!("    ", "Type:", record.bundle_type.as_str());
    if !record.vendor.is_empty() {
        display_field!("    ", "Vendor:", &record.vendor);
    }
    display_field!("    ", "App ID:", &record.app_id);
    display_field!("    ", "Provision:", record.provision_type);
    if record.is_singleton {
        display_field!("    ", "Singleton:", Style::new().cyan().apply_to("yes"));
    }
    if record.is_system_app {
        display_field!("    ", "System:", Style::new().cyan().apply_to("yes"));
    }
    display_field!("    ", "Overlay:", overlay_label(&record.overlay_state));
    display_field!("    ", "Users:", user_list(record));

    println!("    {}", Style::new().bold().apply_to("Modules:"));
    for module in record.modules.values() {
        println!(
            "      {} {}",
            Style::new().cyan().apply_to(&module.module_name),
            Style::new().dim().apply_to(module_role(module))
        );
    }

    match &record.applied_quick_fix {
        Some(fix) => display_field!(
            "    ",
            "Quick fix:",
            format!(
                "{} {} ({})",
                fix.quick_fix_type, fix.patch_version_name, fix.patch_version_code
            )
        ),
        None => display_field!("    ", "Quick fix:", Style::new().dim().apply_to("None")),
    }
    display_field!(
        "    ",
        "Updated:",
        record.update_time.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

fn user_list(record: &InstalledBundleRecord) -> String {
    record
        .user_states
        .keys()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn overlay_label(state: &OverlayState) -> String {
    match state {
        OverlayState::None => "none".to_string(),
        OverlayState::Internal => "internal".to_string(),
        OverlayState::External { target_bundle_name } => {
            format!("external (target {target_bundle_name})")
        }
    }
}

fn module_role(module: &InstalledModule) -> String {
    if module.is_overlay() {
        format!(
            "overlay of {} (priority {})",
            module.target_module_name, module.target_priority
        )
    } else if module.is_entry {
        "entry".to_string()
    } else {
        "feature".to_string()
    }
}
