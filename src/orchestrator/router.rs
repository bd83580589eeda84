//! 路由
//!
//! 把用户输入的路径解析成 [`Route`]。

use std::fmt::Display;

use regex::Regex;

use crate::error::NavigationError;

const ROUTE_PATTERN: &str = r"^/(?:(?P<section>lessons|quizzes|alphabet|about)(?:/(?P<id>\d+))?)?/?$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Lessons,
    Lesson(u32),
    Quizzes,
    Quiz(u32),
    Alphabet,
    About,
}

impl Route {
    /// 测验相关页面（悬浮测验入口在这些页面隐藏）
    pub fn is_quiz(self) -> bool {
        matches!(self, Route::Quizzes | Route::Quiz(_))
    }
}

impl Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::Lessons => write!(f, "/lessons"),
            Route::Lesson(id) => write!(f, "/lessons/{}", id),
            Route::Quizzes => write!(f, "/quizzes"),
            Route::Quiz(id) => write!(f, "/quizzes/{}", id),
            Route::Alphabet => write!(f, "/alphabet"),
            Route::About => write!(f, "/about"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    pattern: Regex,
}

impl Router {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(ROUTE_PATTERN)?,
        })
    }

    pub fn parse(&self, path: &str) -> Result<Route, NavigationError> {
        let path = path.trim();
        let unknown = || NavigationError::UnknownRoute {
            path: path.to_string(),
        };

        let caps = self.pattern.captures(path).ok_or_else(unknown)?;
        let section = caps.name("section").map(|m| m.as_str());
        let id = match caps.name("id") {
            Some(m) => Some(m.as_str().parse::<u32>().map_err(|_| unknown())?),
            None => None,
        };

        match (section, id) {
            (None, None) => Ok(Route::Home),
            (Some("lessons"), None) => Ok(Route::Lessons),
            (Some("lessons"), Some(id)) => Ok(Route::Lesson(id)),
            (Some("quizzes"), None) => Ok(Route::Quizzes),
            (Some("quizzes"), Some(id)) => Ok(Route::Quiz(id)),
            (Some("alphabet"), None) => Ok(Route::Alphabet),
            (Some("about"), None) => Ok(Route::About),
            _ => Err(unknown()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        let router = Router::new().unwrap();
        assert_eq!(router.parse("/"), Ok(Route::Home));
        assert_eq!(router.parse("/lessons"), Ok(Route::Lessons));
        assert_eq!(router.parse("/lessons/3/"), Ok(Route::Lesson(3)));
        assert_eq!(router.parse("/quizzes"), Ok(Route::Quizzes));
        assert_eq!(router.parse(" /quizzes/12 "), Ok(Route::Quiz(12)));
        assert_eq!(router.parse("/alphabet"), Ok(Route::Alphabet));
        assert_eq!(router.parse("/about"), Ok(Route::About));
    }

    #[test]
    fn test_unknown_routes() {
        let router = Router::new().unwrap();
        for path in [
            "/unknown",
            "/alphabet/2",
            "/lessons/abc",
            "/lessons/99999999999",
            "lessons",
            "/about/1",
        ] {
            assert!(
                matches!(router.parse(path), Err(NavigationError::UnknownRoute { .. })),
                "{} should be unknown",
                path
            );
        }
    }

    #[test]
    fn test_display_round_trips() {
        let router = Router::new().unwrap();
        for route in [Route::Home, Route::Lesson(4), Route::Quiz(2), Route::Alphabet] {
            assert_eq!(router.parse(&route.to_string()), Ok(route));
        }
    }

    #[test]
    fn test_quiz_routes() {
        assert!(Route::Quizzes.is_quiz());
        assert!(Route::Quiz(1).is_quiz());
        assert!(!Route::Lesson(1).is_quiz());
    }
}
