//! 应用主循环 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：加载课程内容、偏好设置，准备语音
//! 2. **页面管理**：按路由创建页面状态，离开页面时丢弃
//! 3. **命令分发**：把一行输入交给当前页面处理
//! 4. **事件循环**：同时等待用户输入与朗读结束事件
//!
//! 所有状态变化都是对一行输入的同步响应，只有朗读在后台任务中进行。

use std::io::IsTerminal;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{load_catalog, AlphabetKind, Catalog, Lesson, QuizQuestion};
use crate::orchestrator::quiz_cta::floating_quiz_prompt;
use crate::orchestrator::router::{Route, Router};
use crate::orchestrator::screens;
use crate::services::{
    CommandSynthesizer, PrefsStore, QuizCache, SpeechController, SpeechEvent, SpeechSynthesizer,
    HIDE_FLOATING_QUIZ_CTA,
};
use crate::utils::logging::{log_catalog_loaded, log_startup};
use crate::utils::truncate_text;
use crate::workflow::{FlashcardDeck, LessonStep, LessonView, QuizSession, StepChange};

/// 一行输入的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// 清屏后显示整页
    Screen(String),
    /// 在当前页面下方追加一条消息
    Message(String),
    Quit,
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Screen(text) | Reply::Message(text) => text,
            Reply::Quit => "",
        }
    }
}

/// 当前页面
#[derive(Debug)]
enum View {
    Home,
    Lessons,
    Lesson(LessonView),
    LessonNotFound(u32),
    Quizzes,
    Quiz {
        lesson: Arc<Lesson>,
        session: QuizSession,
    },
    QuizNotFound(u32),
    Alphabet(FlashcardDeck),
    About,
}

/// 页面命令的结果
enum Outcome {
    Redraw,
    Message(String),
    Navigate(Route),
}

/// 应用主结构
pub struct App<S: SpeechSynthesizer = CommandSynthesizer> {
    config: Config,
    catalog: Catalog,
    router: Router,
    prefs: PrefsStore,
    speech: SpeechController<S>,
    speech_events: Option<mpsc::UnboundedReceiver<SpeechEvent>>,
    rng: StdRng,
    quiz_cache: QuizCache,
    route: Route,
    view: View,
}

impl App<CommandSynthesizer> {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let catalog = load_catalog(config.content_dir.as_deref())
            .await
            .context("加载课程内容失败")?;
        log_catalog_loaded(
            catalog.lessons().len(),
            catalog.question_count(),
            catalog.character_count(),
        );

        let prefs = match PrefsStore::load(&config.prefs_file).await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("⚠️ 读取偏好设置失败，使用默认设置: {}", e);
                PrefsStore::in_memory(&config.prefs_file)
            }
        };

        let synthesizer = CommandSynthesizer::new(config.speech_command.clone());
        if !synthesizer.is_available() {
            warn!("⚠️ 未找到语音程序 {}，朗读功能不可用", config.speech_command);
        }

        Self::with_parts(config, catalog, prefs, synthesizer, StdRng::from_entropy())
    }
}

impl<S: SpeechSynthesizer> App<S> {
    /// 用现成的组件组装应用
    pub fn with_parts(
        config: Config,
        catalog: Catalog,
        prefs: PrefsStore,
        synthesizer: S,
        rng: StdRng,
    ) -> Result<Self> {
        let router = Router::new().context("路由表编译失败")?;
        let (speech, speech_events) = SpeechController::new(synthesizer, config.speech_settings());

        Ok(Self {
            config,
            catalog,
            router,
            prefs,
            speech,
            speech_events: Some(speech_events),
            rng,
            quiz_cache: QuizCache::new(),
            route: Route::Home,
            view: View::Home,
        })
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// 运行应用主逻辑
    pub async fn run(mut self) -> Result<()> {
        let mut events = self
            .speech_events
            .take()
            .context("朗读事件通道已被占用")?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        print_screen(&self.render());

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("读取输入失败")? else {
                        break;
                    };
                    match self.handle(&line).await {
                        Reply::Screen(text) => print_screen(&text),
                        Reply::Message(text) => println!("{}", text),
                        Reply::Quit => break,
                    }
                }
                Some(event) = events.recv() => {
                    if let Some(reply) = self.on_speech_event(event) {
                        match reply {
                            Reply::Screen(text) => print_screen(&text),
                            other => println!("{}", other.text()),
                        }
                    }
                }
            }
        }

        self.speech.cancel();
        info!("👋 程序结束");
        Ok(())
    }

    /// 等待下一个朗读事件（`run` 之外驱动应用时使用）
    pub async fn next_speech_event(&mut self) -> Option<SpeechEvent> {
        self.speech_events.as_mut()?.recv().await
    }

    /// 朗读结束：重绘以更新朗读图标，失败时提示用户
    pub fn on_speech_event(&mut self, event: SpeechEvent) -> Option<Reply> {
        match event {
            SpeechEvent::Finished { key } => {
                debug!("朗读事件: {} 完成", key);
                Some(Reply::Screen(self.render()))
            }
            SpeechEvent::Failed { key, error } => {
                warn!("朗读事件: {} 失败: {}", key, error);
                Some(Reply::Message(format!("⚠️ Could not play audio: {}", error)))
            }
        }
    }

    /// 处理一行输入
    pub async fn handle(&mut self, line: &str) -> Reply {
        let line = line.trim();
        if line.is_empty() {
            return Reply::Screen(self.render());
        }
        debug!("输入: {}", truncate_text(line, 40));

        match self.dispatch(line).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("命令失败 {}: {}", truncate_text(line, 40), e);
                Reply::Message(format!("⚠️ {}", e))
            }
        }
    }

    async fn dispatch(&mut self, line: &str) -> AppResult<Reply> {
        if line.starts_with('/') {
            let route = self.router.parse(line)?;
            self.navigate(route).await;
            return Ok(Reply::Screen(self.render()));
        }

        let (command, args) = line
            .split_once(char::is_whitespace)
            .map(|(c, a)| (c, a.trim()))
            .unwrap_or((line, ""));

        let outcome = match command {
            "quit" | "exit" => return Ok(Reply::Quit),
            "help" => return Ok(Reply::Message(screens::help())),
            "dismiss" => {
                self.prefs.set(HIDE_FLOATING_QUIZ_CTA, "1").await?;
                Outcome::Redraw
            }
            _ => self.page_command(command, args)?,
        };

        Ok(match outcome {
            Outcome::Redraw => Reply::Screen(self.render()),
            Outcome::Message(text) => Reply::Message(text),
            Outcome::Navigate(route) => {
                self.navigate(route).await;
                Reply::Screen(self.render())
            }
        })
    }

    fn page_command(&mut self, command: &str, args: &str) -> AppResult<Outcome> {
        let unknown = || AppError::UnknownCommand {
            command: command.to_string(),
        };

        match &mut self.view {
            View::Lesson(view) => match command {
                "next" | "n" => Ok(step_outcome(view.next(), "This is the last step.")),
                "prev" | "p" => Ok(step_outcome(
                    view.previous(),
                    "This is the first step.",
                )),
                "step" => {
                    let number = parse_number(args)?;
                    let change = view.select(number - 1)?;
                    Ok(step_outcome(change, "Already on this step."))
                }
                "say" => {
                    let number = parse_number(args)?;
                    let Some((key, text)) = pronounceable(view, number - 1) else {
                        return Ok(Outcome::Message(
                            "Nothing to pronounce here.".to_string(),
                        ));
                    };
                    self.speech.pronounce(key, &text)?;
                    Ok(Outcome::Redraw)
                }
                "answer" | "check" | "retry" => {
                    let Some(quiz) = view.current_quiz_mut() else {
                        return Ok(Outcome::Message(
                            "This step has no quick check.".to_string(),
                        ));
                    };
                    match command {
                        "answer" => answer(quiz, args)?,
                        "check" => {
                            quiz.reveal();
                        }
                        _ => quiz.retry(),
                    }
                    Ok(Outcome::Redraw)
                }
                _ => Err(unknown()),
            },
            View::Quiz { lesson, session } => match command {
                "answer" => {
                    answer(session, args)?;
                    Ok(Outcome::Redraw)
                }
                "clear" => {
                    session.clear(parse_number(args)? - 1)?;
                    Ok(Outcome::Redraw)
                }
                "submit" => {
                    session.submit()?;
                    Ok(Outcome::Redraw)
                }
                "retry" => {
                    session.retry();
                    Ok(Outcome::Redraw)
                }
                "continue" => {
                    let next = self.catalog.next_lesson_id(lesson.id);
                    match session.unlocked_next_lesson(self.config.pass_threshold, next) {
                        Some(id) => Ok(Outcome::Navigate(Route::Lesson(id))),
                        None => Ok(Outcome::Message(
                            "Pass the quiz to unlock the next lesson.".to_string(),
                        )),
                    }
                }
                _ => Err(unknown()),
            },
            View::Alphabet(deck) => match command {
                "next" | "n" => {
                    deck.next();
                    Ok(Outcome::Redraw)
                }
                "prev" | "p" => {
                    deck.previous();
                    Ok(Outcome::Redraw)
                }
                "flip" | "f" => {
                    deck.flip();
                    Ok(Outcome::Redraw)
                }
                "jump" => {
                    deck.jump(parse_number(args)? - 1)?;
                    Ok(Outcome::Redraw)
                }
                "set" => {
                    let kind = AlphabetKind::find(args)
                        .ok_or_else(|| AppError::invalid_argument(args, "hiragana or katakana"))?;
                    let len = self.catalog.alphabet(kind).characters.len();
                    deck.switch_set(kind, len);
                    Ok(Outcome::Redraw)
                }
                "say" => {
                    let set = self.catalog.alphabet(deck.kind());
                    let Some(character) = deck.index().and_then(|idx| set.characters.get(idx))
                    else {
                        return Ok(Outcome::Message("No card selected.".to_string()));
                    };
                    self.speech
                        .pronounce(screens::kana_key(&character.character), &character.character)?;
                    Ok(Outcome::Redraw)
                }
                _ => Err(unknown()),
            },
            _ => Err(unknown()),
        }
    }

    /// 切换页面：丢弃旧页面状态，重新读取偏好设置
    async fn navigate(&mut self, route: Route) {
        if let View::Lesson(view) = &self.view {
            self.quiz_cache.evict(view.lesson().id);
        }
        self.speech.cancel();
        self.reload_prefs().await;

        self.view = match route {
            Route::Home => View::Home,
            Route::Lessons => View::Lessons,
            Route::Lesson(id) => match self.catalog.lesson(id) {
                Some(lesson) => {
                    let quizzes = self.quiz_cache.get_or_generate(&lesson, &mut self.rng);
                    View::Lesson(LessonView::new(lesson, &quizzes))
                }
                None => {
                    warn!("⚠️ 课程不存在: {}", id);
                    View::LessonNotFound(id)
                }
            },
            Route::Quizzes => View::Quizzes,
            Route::Quiz(id) => match self.catalog.lesson(id).filter(|l| !l.quiz.is_empty()) {
                Some(lesson) => View::Quiz {
                    session: QuizSession::new(lesson.quiz.clone()),
                    lesson,
                },
                None => {
                    warn!("⚠️ 测验不存在: {}", id);
                    View::QuizNotFound(id)
                }
            },
            Route::Alphabet => {
                let kind = AlphabetKind::Hiragana;
                View::Alphabet(FlashcardDeck::new(
                    kind,
                    self.catalog.alphabet(kind).characters.len(),
                ))
            }
            Route::About => View::About,
        };
        self.route = route;
        info!("📖 打开页面: {}", route);
    }

    async fn reload_prefs(&mut self) {
        match PrefsStore::load(self.prefs.path()).await {
            Ok(prefs) => self.prefs = prefs,
            Err(e) => warn!("⚠️ 读取偏好设置失败，沿用当前设置: {}", e),
        }
    }

    /// 渲染当前页面
    pub fn render(&self) -> String {
        let playing = self.speech.playing();
        let playing = playing.as_deref();

        let body = match &self.view {
            View::Home => screens::home(&self.catalog),
            View::Lessons => screens::lesson_list(&self.catalog),
            View::Lesson(view) => screens::lesson(
                view,
                self.catalog.next_lesson_id(view.lesson().id),
                playing,
            ),
            View::LessonNotFound(id) => screens::lesson_not_found(*id),
            View::Quizzes => screens::quiz_list(&self.catalog),
            View::Quiz { lesson, session } => screens::quiz(
                lesson,
                session,
                self.config.pass_threshold,
                self.catalog.next_lesson_id(lesson.id),
            ),
            View::QuizNotFound(id) => screens::quiz_not_found(*id),
            View::Alphabet(deck) => {
                screens::alphabet(self.catalog.alphabet(deck.kind()), deck, playing)
            }
            View::About => screens::about(),
        };

        let dismissed = self.prefs.is_set(HIDE_FLOATING_QUIZ_CTA, "1");
        let found = !matches!(self.view, View::LessonNotFound(_) | View::QuizNotFound(_));
        match floating_quiz_prompt(self.route, found, dismissed) {
            Some(prompt) => format!("{}\n\n{}", body, screens::quiz_prompt(&prompt)),
            None => body,
        }
    }
}

/// 步骤切换后整页重绘（回到顶部）；没有切换时只提示
fn step_outcome(change: Option<StepChange>, unchanged: &str) -> Outcome {
    match change {
        Some(_) => Outcome::Redraw,
        None => Outcome::Message(unchanged.to_string()),
    }
}

/// 当前步骤中第 `index` 个可朗读的条目：词汇步骤读单词，会话步骤读台词
fn pronounceable(view: &LessonView, index: usize) -> Option<(String, String)> {
    let lesson = view.lesson();
    match view.step() {
        LessonStep::Vocabulary => lesson
            .vocabulary
            .get(index)
            .map(|item| (screens::vocab_key(index), item.word.clone())),
        LessonStep::Conversations => lesson
            .conversations
            .iter()
            .flat_map(|dialogue| dialogue.lines.iter())
            .nth(index)
            .map(|line| (screens::line_key(index), line.text.clone())),
        _ => None,
    }
}

/// `answer <题号> <选项编号|文本>`
fn answer(session: &mut QuizSession, args: &str) -> AppResult<()> {
    let (number, value) = args
        .split_once(char::is_whitespace)
        .ok_or_else(|| AppError::invalid_argument(args, "<question> <answer>"))?;
    let index = parse_number(number)? - 1;
    let question = session
        .questions()
        .get(index)
        .ok_or_else(|| AppError::question_out_of_range(index, session.len()))?;
    let value = resolve_answer(question, value)?;
    session.select(index, value)?;
    Ok(())
}

/// 先按选项原文匹配，再按选项编号；填空题也接受自由输入
///
/// 选择题、判断题区分大小写，不做模糊匹配。
fn resolve_answer(question: &QuizQuestion, input: &str) -> AppResult<String> {
    let input = input.trim();

    if let Some(option) = question.options.iter().find(|option| *option == input) {
        return Ok(option.clone());
    }
    if let Some(option) = input
        .parse::<usize>()
        .ok()
        .and_then(|number| question.option_by_number(number))
    {
        return Ok(option.to_string());
    }
    if question.kind.is_free_text() && !input.is_empty() {
        return Ok(input.to_string());
    }
    Err(AppError::invalid_argument(input, "an option or option number"))
}

/// 解析从 1 开始的编号
fn parse_number(value: &str) -> AppResult<usize> {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|number| *number >= 1)
        .ok_or_else(|| AppError::invalid_argument(value.trim(), "a number starting at 1"))
}

fn print_screen(text: &str) {
    if std::io::stdout().is_terminal() {
        print!("\x1B[2J\x1B[H");
    }
    println!("{}", text);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuestionKind;
    use crate::services::scorer;

    fn fill_blank() -> QuizQuestion {
        QuizQuestion {
            id: 1,
            kind: QuestionKind::FillBlank,
            question: "?".to_string(),
            options: vec!["です".to_string(), "は".to_string()],
            correct_answer: "です".to_string(),
            explanation: None,
        }
    }

    #[test]
    fn test_resolve_answer_by_number_or_text() {
        let question = fill_blank();
        assert_eq!(resolve_answer(&question, "1").unwrap(), "です");
        assert_eq!(resolve_answer(&question, "は").unwrap(), "は");
        assert_eq!(resolve_answer(&question, " desu ").unwrap(), "desu");
    }

    #[test]
    fn test_choice_questions_need_an_option() {
        let mut question = fill_blank();
        question.kind = QuestionKind::TrueFalse;
        question.options = vec!["True".to_string(), "False".to_string()];
        assert_eq!(resolve_answer(&question, "False").unwrap(), "False");
        assert!(resolve_answer(&question, "false").is_err());
        assert!(resolve_answer(&question, "3").is_err());
        assert!(resolve_answer(&question, "maybe").is_err());
    }

    #[test]
    fn test_exact_option_text_wins_over_case_variants() {
        let question = QuizQuestion {
            id: 1,
            kind: QuestionKind::MultipleChoice,
            question: "Which one means chopsticks?".to_string(),
            options: vec!["Hashi".to_string(), "hashi".to_string()],
            correct_answer: "hashi".to_string(),
            explanation: None,
        };
        let resolved = resolve_answer(&question, "hashi").unwrap();
        assert_eq!(resolved, "hashi");
        assert!(scorer::is_correct(&question, &resolved));
        assert_eq!(resolve_answer(&question, "1").unwrap(), "Hashi");
    }

    #[test]
    fn test_numeric_option_text_wins_over_option_number() {
        let question = QuizQuestion {
            id: 1,
            kind: QuestionKind::MultipleChoice,
            question: "How many?".to_string(),
            options: vec!["3".to_string(), "2".to_string(), "1".to_string()],
            correct_answer: "3".to_string(),
            explanation: None,
        };
        assert_eq!(resolve_answer(&question, "3").unwrap(), "3");
        assert_eq!(resolve_answer(&question, "2").unwrap(), "2");
    }

    #[test]
    fn test_parse_number_starts_at_one() {
        assert_eq!(parse_number(" 2 ").unwrap(), 2);
        assert!(parse_number("0").is_err());
        assert!(parse_number("two").is_err());
    }
}
