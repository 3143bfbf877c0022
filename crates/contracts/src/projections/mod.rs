pub mod p909_component_report;
