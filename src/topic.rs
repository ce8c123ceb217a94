#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub short_description: &'static str,
}

pub const TOPICS: &[Topic] = &[
    Topic {
        id: "means-of-egress",
        title: "Means of Egress",
        short_description: "Requirements for safe exit routes, including corridors, doors, and stairs.",
    },
    Topic {
        id: "fire-alarm-systems",
        title: "Fire Alarm Systems",
        short_description: "Detection, notification, and monitoring of fire alarm systems.",
    },
    Topic {
        id: "sprinkler-systems",
        title: "Sprinkler Systems",
        short_description: "Installation, maintenance, and testing of automatic sprinkler systems.",
    },
    Topic {
        id: "hazardous-areas",
        title: "Hazardous Areas",
        short_description: "Protection requirements for areas with high fire risk.",
    },
    Topic {
        id: "emergency-lighting",
        title: "Emergency Lighting",
        short_description: "Ensuring illumination for egress paths during power outages.",
    },
    Topic {
        id: "fire-drills",
        title: "Fire Drills & Staff Training",
        short_description: "Conducting fire drills and ensuring staff are trained for emergencies.",
    },
    Topic {
        id: "smoking-regulations",
        title: "Smoking Regulations",
        short_description: "Policies and safety measures related to smoking in healthcare facilities.",
    },
];

pub fn find_topic(id: &str) -> Option<&'static Topic> {
    let id = id.trim();
    TOPICS.iter().find(|topic| topic.id.eq_ignore_ascii_case(id))
}

pub fn topic_ids() -> Vec<&'static str> {
    TOPICS.iter().map(|topic| topic.id).collect()
}
