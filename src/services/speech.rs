//! 语音朗读服务 - 业务能力层
//!
//! 只负责"把一段日语读出来"以及"哪个条目正在朗读"的状态，不关心页面。
//!
//! ## 模型
//! - 发起朗读是同步的，播放在 tokio 任务里进行
//! - 播放结束或失败都会清除正在朗读标记，并通过 channel 发出 [`SpeechEvent`]
//! - 同一条目朗读期间再次请求返回 [`SpeechError::Busy`]（按钮禁用）
//! - 开始新的朗读前取消正在进行的朗读
//! - 平台没有语音能力时直接报错，不重试

use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::SpeechError;

/// 朗读参数
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    /// 语言标签
    pub language: String,
    /// 语速（1.0 为正常，学习时稍慢）
    pub rate: f32,
    /// 音调（1.0 为正常）
    pub pitch: f32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: "ja-JP".to_string(),
            rate: 0.8,
            pitch: 1.0,
        }
    }
}

/// 一次朗读请求
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub language: String,
    pub rate: f32,
    pub pitch: f32,
}

impl Utterance {
    pub fn new(text: impl Into<String>, settings: &SpeechSettings) -> Self {
        Self {
            text: text.into(),
            language: settings.language.clone(),
            rate: settings.rate,
            pitch: settings.pitch,
        }
    }
}

/// 平台语音能力
pub trait SpeechSynthesizer: Send + Sync + 'static {
    /// 平台是否支持语音合成
    fn is_available(&self) -> bool;

    /// 朗读，播放完成后返回
    fn speak(&self, utterance: Utterance) -> impl Future<Output = Result<(), SpeechError>> + Send;
}

/// 朗读结束事件
#[derive(Debug, Clone, PartialEq)]
pub enum SpeechEvent {
    Finished { key: String },
    Failed { key: String, error: SpeechError },
}

/// 正在朗读的条目，`generation` 区分同一条目的先后两次朗读
#[derive(Debug, Clone, PartialEq)]
struct InFlight {
    generation: u64,
    key: String,
}

/// 朗读控制器
pub struct SpeechController<S: SpeechSynthesizer> {
    synthesizer: Arc<S>,
    settings: SpeechSettings,
    in_flight: Arc<Mutex<Option<InFlight>>>,
    next_generation: u64,
    current: Option<JoinHandle<()>>,
    events: mpsc::UnboundedSender<SpeechEvent>,
}

impl<S: SpeechSynthesizer> SpeechController<S> {
    /// 创建控制器，同时返回朗读结束事件的接收端
    pub fn new(
        synthesizer: S,
        settings: SpeechSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SpeechEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let controller = Self {
            synthesizer: Arc::new(synthesizer),
            settings,
            in_flight: Arc::new(Mutex::new(None)),
            next_generation: 0,
            current: None,
            events: tx,
        };
        (controller, rx)
    }

    /// 正在朗读的条目
    pub fn playing(&self) -> Option<String> {
        lock(&self.in_flight).as_ref().map(|f| f.key.clone())
    }

    pub fn is_playing(&self, key: &str) -> bool {
        lock(&self.in_flight)
            .as_ref()
            .is_some_and(|f| f.key == key)
    }

    /// 朗读一个条目
    ///
    /// # 参数
    /// - `key`: 条目标识（按钮），同一时刻只有一个条目处于朗读中
    /// - `text`: 要朗读的文本
    pub fn pronounce(&mut self, key: impl Into<String>, text: &str) -> Result<(), SpeechError> {
        let key = key.into();
        if self.is_playing(&key) {
            return Err(SpeechError::Busy { key });
        }

        self.cancel();

        if !self.synthesizer.is_available() {
            warn!("⚠️ 当前系统不支持语音合成，无法朗读 {}", key);
            return Err(SpeechError::NotSupported);
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        *lock(&self.in_flight) = Some(InFlight {
            generation,
            key: key.clone(),
        });
        debug!("🔊 开始朗读 {} (#{}): {}", key, generation, text);

        let utterance = Utterance::new(text, &self.settings);
        let synthesizer = Arc::clone(&self.synthesizer);
        let in_flight = Arc::clone(&self.in_flight);
        let events = self.events.clone();

        self.current = Some(tokio::spawn(async move {
            let result = synthesizer.speak(utterance).await;

            // 已被取消或被新的朗读取代，不再清标记也不发事件
            if !settle(&in_flight, generation) {
                debug!("丢弃过期的朗读结果: {} (#{})", key, generation);
                return;
            }

            let event = match result {
                Ok(()) => {
                    debug!("朗读结束: {}", key);
                    SpeechEvent::Finished { key }
                }
                Err(error) => {
                    warn!("朗读失败 {}: {}", key, error);
                    SpeechEvent::Failed { key, error }
                }
            };
            // 接收端已关闭时忽略
            let _ = events.send(event);
        }));

        Ok(())
    }

    /// 取消正在进行的朗读
    pub fn cancel(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
        }
        *lock(&self.in_flight) = None;
    }
}

impl<S: SpeechSynthesizer> Drop for SpeechController<S> {
    fn drop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
        }
    }
}

/// 朗读结束时清除标记，只有标记仍属于这次朗读才返回 true
fn settle(in_flight: &Mutex<Option<InFlight>>, generation: u64) -> bool {
    let mut marker = lock(in_flight);
    match marker.as_ref() {
        Some(current) if current.generation == generation => {
            *marker = None;
            true
        }
        _ => false,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// 调用外部 TTS 程序（默认 espeak-ng）朗读
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// 在 PATH 中查找程序
    fn resolve(&self) -> Option<PathBuf> {
        let candidate = Path::new(&self.program);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(&self.program))
            .find(|path| path.is_file())
    }
}

/// "ja-JP" → "ja"
fn voice_for(language: &str) -> &str {
    language.split(['-', '_']).next().unwrap_or(language)
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    fn speak(&self, utterance: Utterance) -> impl Future<Output = Result<(), SpeechError>> + Send {
        // espeak-ng: 默认 175 词/分钟，音调 0-99（默认 50）
        let words_per_minute = (175.0 * utterance.rate).round().max(1.0) as u32;
        let pitch = (50.0 * utterance.pitch).round().clamp(0.0, 99.0) as u32;

        let mut command = Command::new(&self.program);
        command
            .arg("-v")
            .arg(voice_for(&utterance.language))
            .arg("-s")
            .arg(words_per_minute.to_string())
            .arg("-p")
            .arg(pitch.to_string())
            .arg(&utterance.text)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        let program = self.program.clone();

        async move {
            let status = command.status().await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SpeechError::NotSupported
                } else {
                    SpeechError::PlaybackFailed(format!("{}: {}", program, e))
                }
            })?;

            if status.success() {
                info!("🔊 {} 播放完成", program);
                Ok(())
            } else {
                Err(SpeechError::PlaybackFailed(format!(
                    "{} exited with {}",
                    program, status
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::Semaphore;

    /// 每次朗读都要等一个许可，测试里手动控制何时结束
    struct GatedSynthesizer {
        available: bool,
        fail: bool,
        gate: Arc<Semaphore>,
        spoken: Arc<Mutex<Vec<Utterance>>>,
    }

    impl GatedSynthesizer {
        fn new(available: bool, fail: bool) -> (Self, Arc<Semaphore>, Arc<Mutex<Vec<Utterance>>>) {
            let gate = Arc::new(Semaphore::new(0));
            let spoken = Arc::new(Mutex::new(Vec::new()));
            let synth = Self {
                available,
                fail,
                gate: Arc::clone(&gate),
                spoken: Arc::clone(&spoken),
            };
            (synth, gate, spoken)
        }
    }

    impl SpeechSynthesizer for GatedSynthesizer {
        fn is_available(&self) -> bool {
            self.available
        }

        fn speak(
            &self,
            utterance: Utterance,
        ) -> impl Future<Output = Result<(), SpeechError>> + Send {
            lock(&self.spoken).push(utterance);
            let gate = Arc::clone(&self.gate);
            let fail = self.fail;
            async move {
                let permit = gate.acquire_owned().await;
                drop(permit);
                if fail {
                    Err(SpeechError::PlaybackFailed("device busy".to_string()))
                } else {
                    Ok(())
                }
            }
        }
    }

    #[tokio::test]
    async fn test_pronounce_marks_item_until_finished() {
        let (synth, gate, spoken) = GatedSynthesizer::new(true, false);
        let (mut controller, mut events) = SpeechController::new(synth, SpeechSettings::default());

        controller.pronounce("vocab-0", "こんにちは").unwrap();
        assert!(controller.is_playing("vocab-0"));
        assert_eq!(
            controller.pronounce("vocab-0", "こんにちは"),
            Err(SpeechError::Busy {
                key: "vocab-0".to_string()
            })
        );

        gate.add_permits(1);
        assert_eq!(
            events.recv().await,
            Some(SpeechEvent::Finished {
                key: "vocab-0".to_string()
            })
        );
        assert_eq!(controller.playing(), None);

        let spoken = lock(&spoken);
        assert_eq!(spoken.len(), 1);
        assert_eq!(spoken[0].language, "ja-JP");
        assert_eq!(spoken[0].rate, 0.8);
        assert_eq!(spoken[0].pitch, 1.0);
    }

    #[tokio::test]
    async fn test_unavailable_platform_reports_and_clears() {
        let (synth, _gate, spoken) = GatedSynthesizer::new(false, false);
        let (mut controller, mut events) = SpeechController::new(synth, SpeechSettings::default());

        assert_eq!(
            controller.pronounce("あ", "あ"),
            Err(SpeechError::NotSupported)
        );
        assert_eq!(controller.playing(), None);
        assert!(events.try_recv().is_err());
        assert!(lock(&spoken).is_empty());
    }

    #[tokio::test]
    async fn test_failure_clears_marker() {
        let (synth, gate, _spoken) = GatedSynthesizer::new(true, true);
        let (mut controller, mut events) = SpeechController::new(synth, SpeechSettings::default());

        controller.pronounce("い", "い").unwrap();
        gate.add_permits(1);

        match events.recv().await {
            Some(SpeechEvent::Failed { key, error }) => {
                assert_eq!(key, "い");
                assert!(matches!(error, SpeechError::PlaybackFailed(_)));
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(controller.playing(), None);
    }

    #[tokio::test]
    async fn test_new_request_cancels_in_flight_one() {
        let (synth, gate, _spoken) = GatedSynthesizer::new(true, false);
        let (mut controller, mut events) = SpeechController::new(synth, SpeechSettings::default());

        controller.pronounce("a", "あ").unwrap();
        controller.pronounce("b", "い").unwrap();
        assert_eq!(controller.playing().as_deref(), Some("b"));

        gate.add_permits(1);
        assert_eq!(
            events.recv().await,
            Some(SpeechEvent::Finished {
                key: "b".to_string()
            })
        );
        assert_eq!(controller.playing(), None);
    }

    #[test]
    fn test_stale_completion_keeps_newer_marker() {
        let in_flight = Mutex::new(Some(InFlight {
            generation: 2,
            key: "vocab-0".to_string(),
        }));

        // 同一条目上一次（已取消）的朗读结束
        assert!(!settle(&in_flight, 1));
        assert_eq!(lock(&in_flight).as_ref().map(|f| f.generation), Some(2));

        assert!(settle(&in_flight, 2));
        assert_eq!(*lock(&in_flight), None);
        assert!(!settle(&in_flight, 2));
    }

    #[tokio::test]
    async fn test_replaying_same_item_after_cancel_reports_once() {
        let (synth, gate, spoken) = GatedSynthesizer::new(true, false);
        let (mut controller, mut events) = SpeechController::new(synth, SpeechSettings::default());

        controller.pronounce("a", "あ").unwrap();
        // 让第一次朗读开始播放后再取消
        tokio::task::yield_now().await;
        controller.cancel();
        controller.pronounce("a", "あ").unwrap();
        assert!(controller.is_playing("a"));

        gate.add_permits(1);
        assert_eq!(
            events.recv().await,
            Some(SpeechEvent::Finished {
                key: "a".to_string()
            })
        );
        assert_eq!(controller.playing(), None);
        assert!(events.try_recv().is_err());
        assert_eq!(lock(&spoken).len(), 2);
    }

    #[test]
    fn test_voice_for_language_tag() {
        assert_eq!(voice_for("ja-JP"), "ja");
        assert_eq!(voice_for("ja"), "ja");
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let synth = CommandSynthesizer::new("definitely-not-a-tts-program-xyz");
        assert!(!synth.is_available());
    }
}
