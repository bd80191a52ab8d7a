use metrics::counter;

/// Increment the counter for completed registrations.
pub fn increment_registrations() {
    counter!("registrations_total").increment(1);
}

/// Increment the counter for successful logins.
pub fn increment_login_success() {
    counter!("logins_total", "outcome" => "success").increment(1);
}

/// Increment the counter for rejected login attempts.
pub fn increment_login_failure() {
    counter!("logins_total", "outcome" => "failure").increment(1);
}

/// Increment the counter for pantry item inserts.
pub fn increment_items_added() {
    counter!("items_added_total").increment(1);
}
