use rand::Rng;

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn random_base36(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

/// `friend-` followed by the lowercased name, non-alphanumerics become `-`
pub fn friend_id_base(name: &str) -> String {
    let slug: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect();
    format!("friend-{}", slug)
}

/// Friend id for `name` that `taken` does not already claim
pub fn generate_friend_id(name: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = friend_id_base(name);
    if !taken(&base) {
        return base;
    }

    loop {
        let candidate = format!("{}-{}", base, random_base36(5));
        if !taken(&candidate) {
            return candidate;
        }
    }
}

/// `<prefix>-<unix millis>-<9 base36 chars>`. Collisions are possible in principle, not in practice.
pub fn event_id(prefix: &str) -> String {
    format!(
        "{}-{}-{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        random_base36(9)
    )
}
