/// Browser, OS and device class recorded with each login session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAgent {
    pub browser: String,
    pub os: String,
    pub device: String,
}

const UNKNOWN: &str = "Unknown";

pub fn parse_user_agent(user_agent: Option<&str>) -> ClientAgent {
    let Some(ua) = user_agent.map(str::trim).filter(|ua| !ua.is_empty()) else {
        return ClientAgent {
            browser: UNKNOWN.into(),
            os: UNKNOWN.into(),
            device: UNKNOWN.into(),
        };
    };

    ClientAgent {
        browser: browser(ua).into(),
        os: os(ua).into(),
        device: device(ua).into(),
    }
}

// Order matters: Edge and Opera also announce Chrome, Chrome announces Safari.
fn browser(ua: &str) -> &'static str {
    if ua.contains("Edg/") || ua.contains("Edge/") {
        "Edge"
    } else if ua.contains("OPR/") || ua.contains("Opera") {
        "Opera"
    } else if ua.contains("Firefox/") {
        "Firefox"
    } else if ua.contains("Chrome/") || ua.contains("CriOS/") {
        "Chrome"
    } else if ua.contains("Safari/") {
        "Safari"
    } else if ua.starts_with("curl/") {
        "curl"
    } else if ua.starts_with("PostmanRuntime/") {
        "Postman"
    } else {
        UNKNOWN
    }
}

fn os(ua: &str) -> &'static str {
    if ua.contains("Windows") {
        "Windows"
    } else if ua.contains("Android") {
        "Android"
    } else if ua.contains("iPhone") || ua.contains("iPad") || ua.contains("iPod") {
        "iOS"
    } else if ua.contains("Mac OS X") || ua.contains("Macintosh") {
        "macOS"
    } else if ua.contains("CrOS") {
        "ChromeOS"
    } else if ua.contains("Linux") {
        "Linux"
    } else {
        UNKNOWN
    }
}

fn device(ua: &str) -> &'static str {
    if ua.contains("iPad") || ua.contains("Tablet") {
        "Tablet"
    } else if ua.contains("Mobi") || ua.contains("iPhone") || ua.contains("Android") {
        "Mobile"
    } else if ua.contains("Mozilla/") {
        "Desktop"
    } else {
        "Other"
    }
}
