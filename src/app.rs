use crate::analytics::AnalyticsView;
use crate::config::Config;
use crate::error::AppError;
use crate::input::TextInput;
use crate::logger;
use crate::models::{AppState, NoteDraft, QuizSource, SourceKind, User};
use crate::notes::NoteBook;
use crate::quiz::{QuizPhase, QuizSession, QUESTION_COUNT_CHOICES};
use crate::theme::ThemeContext;
use crate::transcribe::{Recorder, RecorderState, TranscriptShelf};
use crate::validation::{self, FormErrors, OTP_LENGTH};
use crate::worker::{ApiRequest, ApiResponse};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;
use tokio::time::Instant;

const TOAST_TTL: Duration = Duration::from_secs(4);
const MAX_TOASTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub created: Instant,
}

/// Step to the next (or previous) entry of `items`, wrapping around.
fn cycle<T: Copy + PartialEq>(items: &[T], current: T, forward: bool) -> T {
    let pos = items.iter().position(|i| *i == current).unwrap_or(0);
    let len = items.len();
    let next = if forward { (pos + 1) % len } else { (pos + len - 1) % len };
    items[next]
}

fn is_ctrl(key: &KeyEvent, c: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInFocus {
    Email,
    Password,
    Submit,
    CreateAccount,
    ForgotPassword,
}

const SIGN_IN_ORDER: [SignInFocus; 5] = [
    SignInFocus::Email,
    SignInFocus::Password,
    SignInFocus::Submit,
    SignInFocus::CreateAccount,
    SignInFocus::ForgotPassword,
];

#[derive(Debug, Clone)]
pub struct SignInForm {
    pub email: TextInput,
    pub password: TextInput,
    pub focus: SignInFocus,
    pub errors: FormErrors,
    pub message: Option<String>,
}

impl Default for SignInForm {
    fn default() -> Self {
        Self {
            email: TextInput::new(),
            password: TextInput::new(),
            focus: SignInFocus::Email,
            errors: FormErrors::new(),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpFocus {
    Name,
    Email,
    Password,
    Confirm,
    Terms,
    Submit,
    SignIn,
}

const SIGN_UP_ORDER: [SignUpFocus; 7] = [
    SignUpFocus::Name,
    SignUpFocus::Email,
    SignUpFocus::Password,
    SignUpFocus::Confirm,
    SignUpFocus::Terms,
    SignUpFocus::Submit,
    SignUpFocus::SignIn,
];

#[derive(Debug, Clone)]
pub struct SignUpForm {
    pub name: TextInput,
    pub email: TextInput,
    pub password: TextInput,
    pub confirm: TextInput,
    pub agreed: bool,
    pub focus: SignUpFocus,
    pub errors: FormErrors,
    pub message: Option<String>,
}

impl Default for SignUpForm {
    fn default() -> Self {
        Self {
            name: TextInput::new(),
            email: TextInput::new(),
            password: TextInput::new(),
            confirm: TextInput::new(),
            agreed: false,
            focus: SignUpFocus::Name,
            errors: FormErrors::new(),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetFocus {
    Otp,
    Password,
    Confirm,
}

const RESET_ORDER: [ResetFocus; 3] = [ResetFocus::Otp, ResetFocus::Password, ResetFocus::Confirm];

#[derive(Debug, Clone)]
pub struct ResetForm {
    pub email: String,
    pub otp: TextInput,
    pub password: TextInput,
    pub confirm: TextInput,
    pub focus: ResetFocus,
    pub errors: FormErrors,
    pub message: Option<String>,
}

impl Default for ResetForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            otp: TextInput::code(OTP_LENGTH),
            password: TextInput::new(),
            confirm: TextInput::new(),
            focus: ResetFocus::Otp,
            errors: FormErrors::new(),
            message: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SimpleForm {
    pub input: TextInput,
    pub errors: FormErrors,
    pub message: Option<String>,
}

impl SimpleForm {
    fn with_input(input: TextInput) -> Self {
        Self {
            input,
            errors: FormErrors::new(),
            message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeItem {
    Notes,
    Transcribe,
    Quizzes,
    Analytics,
    Theme,
    SignOut,
}

pub const HOME_ITEMS: [HomeItem; 6] = [
    HomeItem::Notes,
    HomeItem::Transcribe,
    HomeItem::Quizzes,
    HomeItem::Analytics,
    HomeItem::Theme,
    HomeItem::SignOut,
];

impl HomeItem {
    pub fn label(&self) -> &'static str {
        match self {
            HomeItem::Notes => "Notes",
            HomeItem::Transcribe => "Transcribe",
            HomeItem::Quizzes => "Quizzes",
            HomeItem::Analytics => "Analytics",
            HomeItem::Theme => "Theme",
            HomeItem::SignOut => "Sign out",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            HomeItem::Notes => "Write and organize markdown notes",
            HomeItem::Transcribe => "Capture lecture transcripts",
            HomeItem::Quizzes => "Generate AI quizzes from your notes",
            HomeItem::Analytics => "Track your quiz performance",
            HomeItem::Theme => "Switch between light, dark and system colors",
            HomeItem::SignOut => "End this session",
        }
    }
}

/// A note or transcript opened for reading.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewing {
    pub kind: SourceKind,
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
    pub return_to: AppState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorFocus {
    Title,
    Content,
}

#[derive(Debug, Clone)]
pub struct NoteEditor {
    pub kind: SourceKind,
    /// `None` while creating.
    pub id: Option<String>,
    pub title: TextInput,
    pub content: TextInput,
    pub focus: EditorFocus,
    pub preview: bool,
    pub return_to: AppState,
}

impl NoteEditor {
    fn draft(&self) -> NoteDraft {
        NoteDraft {
            title: self.title.value().to_string(),
            content: self.content.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    pub kind: SourceKind,
    pub title: String,
    pub return_to: AppState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscribeFocus {
    Title,
    Dictation,
    Saved,
}

const TRANSCRIBE_ORDER: [TranscribeFocus; 3] = [
    TranscribeFocus::Dictation,
    TranscribeFocus::Title,
    TranscribeFocus::Saved,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generating {
    pub ticket: u64,
    pub title: String,
}

#[derive(Debug, Clone)]
pub enum AnalyticsStatus {
    Loading,
    Ready(AnalyticsView),
    Failed(String),
}

pub struct App {
    pub state: AppState,
    pub previous_state: AppState,
    pub should_quit: bool,
    pub user: Option<User>,
    pub theme: ThemeContext,
    pub toasts: Vec<Toast>,
    pub busy: Option<String>,
    question_count: u32,
    outbox: Vec<ApiRequest>,

    pub sign_in: SignInForm,
    pub sign_up: SignUpForm,
    pub verify: SimpleForm,
    pub pending_email: Option<String>,
    pub forgot: SimpleForm,
    pub reset: ResetForm,

    pub home_selected: usize,

    pub notes: NoteBook,
    pub search: TextInput,
    pub search_active: bool,
    pub viewing: Option<Viewing>,
    pub view_scroll: u16,
    pub editor: Option<NoteEditor>,
    pub delete_target: Option<DeleteTarget>,

    pub recorder: Recorder,
    pub transcript_title: TextInput,
    pub transcribe_focus: TranscribeFocus,
    pub transcripts: TranscriptShelf,

    pub picker_selected: usize,
    pub picker_count: usize,
    pub generating: Option<Generating>,
    next_ticket: u64,
    pub quiz: QuizSession,
    pub option_cursor: usize,
    pub results_scroll: u16,

    pub analytics: AnalyticsStatus,
}

impl App {
    pub fn new(config: &Config, theme: ThemeContext) -> Self {
        let picker_count = QUESTION_COUNT_CHOICES
            .iter()
            .position(|c| *c == config.question_count)
            .unwrap_or(1);
        Self {
            state: AppState::Loading,
            previous_state: AppState::Loading,
            should_quit: false,
            user: None,
            theme,
            toasts: Vec::new(),
            busy: None,
            question_count: config.question_count,
            outbox: vec![ApiRequest::CheckSession],
            sign_in: SignInForm::default(),
            sign_up: SignUpForm::default(),
            verify: SimpleForm::with_input(TextInput::code(OTP_LENGTH)),
            pending_email: None,
            forgot: SimpleForm::with_input(TextInput::new()),
            reset: ResetForm::default(),
            home_selected: 0,
            notes: NoteBook::new(config.submit_cooldown),
            search: TextInput::new(),
            search_active: false,
            viewing: None,
            view_scroll: 0,
            editor: None,
            delete_target: None,
            recorder: Recorder::new(),
            transcript_title: TextInput::new(),
            transcribe_focus: TranscribeFocus::Dictation,
            transcripts: TranscriptShelf::new(),
            picker_selected: 0,
            picker_count,
            generating: None,
            next_ticket: 0,
            quiz: QuizSession::new(),
            option_cursor: 0,
            results_scroll: 0,
            analytics: AnalyticsStatus::Loading,
        }
    }

    /// Requests queued since the last call, in order.
    pub fn take_requests(&mut self) -> Vec<ApiRequest> {
        std::mem::take(&mut self.outbox)
    }

    fn request(&mut self, request: ApiRequest) {
        self.outbox.push(request);
    }

    pub fn toast(&mut self, kind: ToastKind, message: impl Into<String>) {
        let message = message.into();
        if kind == ToastKind::Error {
            logger::warn(&message);
        }
        self.toasts.push(Toast {
            kind,
            message,
            created: Instant::now(),
        });
        if self.toasts.len() > MAX_TOASTS {
            let overflow = self.toasts.len() - MAX_TOASTS;
            self.toasts.drain(..overflow);
        }
    }

    fn toast_error(&mut self, err: &AppError) {
        self.toast(ToastKind::Error, err.user_message());
    }

    /// Drop expired notifications.
    pub fn tick(&mut self) {
        self.toasts.retain(|t| t.created.elapsed() < TOAST_TTL);
    }

    pub fn question_count(&self) -> u32 {
        QUESTION_COUNT_CHOICES
            .get(self.picker_count)
            .copied()
            .unwrap_or(self.question_count)
    }

    /// Switch screens. Protected screens bounce to sign-in without a user;
    /// list screens refetch their data on entry.
    pub fn navigate(&mut self, target: AppState) {
        if target.requires_auth() && self.user.is_none() {
            self.state = AppState::SignIn;
            return;
        }
        self.state = target;
        match target {
            AppState::Notes => {
                self.search_active = false;
                self.request(ApiRequest::LoadNotes);
            }
            AppState::Transcribe => self.request(ApiRequest::LoadTranscripts),
            AppState::Quizzes => self.request(ApiRequest::LoadNotes),
            AppState::Analytics => {
                self.analytics = AnalyticsStatus::Loading;
                self.request(ApiRequest::LoadAnalytics);
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if is_ctrl(&key, 'c') {
            self.should_quit = true;
            return;
        }
        match self.state {
            AppState::Loading => {}
            AppState::SignIn => self.handle_sign_in_input(key),
            AppState::SignUp => self.handle_sign_up_input(key),
            AppState::VerifyEmail => self.handle_verify_input(key),
            AppState::ForgotPassword => self.handle_forgot_input(key),
            AppState::ResetPassword => self.handle_reset_input(key),
            AppState::Home => self.handle_home_input(key),
            AppState::Notes => self.handle_notes_input(key),
            AppState::NoteView => self.handle_view_input(key),
            AppState::NoteEditor => self.handle_editor_input(key),
            AppState::DeleteConfirm => self.handle_delete_input(key),
            AppState::Transcribe => self.handle_transcribe_input(key),
            AppState::Quizzes => self.handle_quizzes_input(key),
            AppState::Quiz => self.handle_quiz_input(key),
            AppState::QuizResults => self.handle_results_input(key),
            AppState::Analytics => self.handle_analytics_input(key),
            AppState::QuitConfirm => self.handle_quit_input(key),
        }
    }

    fn ask_quit(&mut self) {
        self.previous_state = self.state;
        self.state = AppState::QuitConfirm;
    }

    fn handle_quit_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => self.should_quit = true,
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = self.previous_state;
            }
            _ => {}
        }
    }

    // Auth screens

    fn handle_sign_in_input(&mut self, key: KeyEvent) {
        let form = &mut self.sign_in;
        match key.code {
            KeyCode::Esc => return self.ask_quit(),
            KeyCode::Tab | KeyCode::Down => {
                form.focus = cycle(&SIGN_IN_ORDER, form.focus, true);
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = cycle(&SIGN_IN_ORDER, form.focus, false);
                return;
            }
            KeyCode::Enter => {
                return match form.focus {
                    SignInFocus::CreateAccount => {
                        self.sign_up = SignUpForm::default();
                        self.state = AppState::SignUp;
                    }
                    SignInFocus::ForgotPassword => {
                        self.forgot = SimpleForm::with_input(TextInput::with_value(
                            self.sign_in.email.value(),
                        ));
                        self.state = AppState::ForgotPassword;
                    }
                    _ => self.submit_sign_in(),
                };
            }
            _ => {}
        }
        let input = match form.focus {
            SignInFocus::Email => &mut form.email,
            SignInFocus::Password => &mut form.password,
            _ => return,
        };
        if input.handle_key(key) {
            form.errors = FormErrors::new();
            form.message = None;
        }
    }

    fn submit_sign_in(&mut self) {
        if self.busy.is_some() {
            return;
        }
        let form = &mut self.sign_in;
        form.errors = validation::validate_sign_in(form.email.value(), form.password.value());
        if !form.errors.is_empty() {
            return;
        }
        let request = ApiRequest::SignIn {
            email: form.email.value().trim().to_string(),
            password: form.password.value().to_string(),
        };
        self.busy = Some("Signing in...".to_string());
        self.request(request);
    }

    fn handle_sign_up_input(&mut self, key: KeyEvent) {
        let form = &mut self.sign_up;
        match key.code {
            KeyCode::Esc => {
                self.state = AppState::SignIn;
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus = cycle(&SIGN_UP_ORDER, form.focus, true);
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = cycle(&SIGN_UP_ORDER, form.focus, false);
                return;
            }
            KeyCode::Char(' ') if form.focus == SignUpFocus::Terms => {
                form.agreed = !form.agreed;
                form.errors.clear(validation::Field::Terms);
                return;
            }
            KeyCode::Enter => {
                return match form.focus {
                    SignUpFocus::Terms => form.agreed = !form.agreed,
                    SignUpFocus::SignIn => self.state = AppState::SignIn,
                    _ => self.submit_sign_up(),
                };
            }
            _ => {}
        }
        let (input, field) = match form.focus {
            SignUpFocus::Name => (&mut form.name, validation::Field::Name),
            SignUpFocus::Email => (&mut form.email, validation::Field::Email),
            SignUpFocus::Password => (&mut form.password, validation::Field::Password),
            SignUpFocus::Confirm => (&mut form.confirm, validation::Field::ConfirmPassword),
            _ => return,
        };
        if input.handle_key(key) {
            form.errors.clear(field);
            form.message = None;
        }
    }

    fn submit_sign_up(&mut self) {
        if self.busy.is_some() {
            return;
        }
        let form = &mut self.sign_up;
        form.errors = validation::validate_sign_up(
            form.name.value(),
            form.email.value(),
            form.password.value(),
            form.confirm.value(),
            form.agreed,
        );
        if !form.errors.is_empty() {
            return;
        }
        let request = ApiRequest::SignUp {
            name: form.name.value().trim().to_string(),
            email: form.email.value().trim().to_string(),
            password: form.password.value().to_string(),
        };
        self.busy = Some("Sending verification code...".to_string());
        self.request(request);
    }

    fn handle_verify_input(&mut self, key: KeyEvent) {
        if is_ctrl(&key, 'r') {
            if self.busy.is_none() {
                self.busy = Some("Resending code...".to_string());
                self.request(ApiRequest::ResendOtp);
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.state = AppState::SignUp,
            KeyCode::Enter => {
                if self.busy.is_some() {
                    return;
                }
                let otp = self.verify.input.value().to_string();
                if otp.chars().count() != OTP_LENGTH {
                    self.verify.message = Some("Please enter the complete 6-digit code".to_string());
                    return;
                }
                self.busy = Some("Verifying...".to_string());
                self.request(ApiRequest::VerifySignUp { otp });
            }
            _ => {
                if self.verify.input.handle_key(key) {
                    self.verify.message = None;
                }
            }
        }
    }

    fn handle_forgot_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.state = AppState::SignIn,
            KeyCode::Enter => {
                if self.busy.is_some() {
                    return;
                }
                let email = self.forgot.input.value().trim().to_string();
                self.forgot.errors = validation::validate_forgot_password(&email);
                if self.forgot.errors.is_empty() {
                    self.busy = Some("Sending reset code...".to_string());
                    self.request(ApiRequest::ForgotPassword { email });
                }
            }
            _ => {
                if self.forgot.input.handle_key(key) {
                    self.forgot.errors = FormErrors::new();
                    self.forgot.message = None;
                }
            }
        }
    }

    fn handle_reset_input(&mut self, key: KeyEvent) {
        let form = &mut self.reset;
        match key.code {
            KeyCode::Esc => self.state = AppState::ForgotPassword,
            KeyCode::Tab | KeyCode::Down => form.focus = cycle(&RESET_ORDER, form.focus, true),
            KeyCode::BackTab | KeyCode::Up => form.focus = cycle(&RESET_ORDER, form.focus, false),
            KeyCode::Enter => self.submit_reset(),
            _ => {
                let input = match form.focus {
                    ResetFocus::Otp => &mut form.otp,
                    ResetFocus::Password => &mut form.password,
                    ResetFocus::Confirm => &mut form.confirm,
                };
                if input.handle_key(key) {
                    form.errors = FormErrors::new();
                    form.message = None;
                }
            }
        }
    }

    fn submit_reset(&mut self) {
        if self.busy.is_some() {
            return;
        }
        let form = &mut self.reset;
        form.errors = validation::validate_reset_password(
            form.otp.value(),
            form.password.value(),
            form.confirm.value(),
        );
        if !form.errors.is_empty() {
            return;
        }
        let request = ApiRequest::ResetPassword {
            email: form.email.clone(),
            otp: form.otp.value().to_string(),
            new_password: form.password.value().to_string(),
        };
        self.busy = Some("Resetting password...".to_string());
        self.request(request);
    }

    // Home

    fn handle_home_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.home_selected = self.home_selected.saturating_sub(1),
            KeyCode::Down => {
                self.home_selected = (self.home_selected + 1).min(HOME_ITEMS.len() - 1);
            }
            KeyCode::Char(c @ '1'..='4') => {
                let index = c as usize - '1' as usize;
                self.home_selected = index;
                self.activate_home_item(HOME_ITEMS[index]);
            }
            KeyCode::Char('t') => self.activate_home_item(HomeItem::Theme),
            KeyCode::Enter => self.activate_home_item(HOME_ITEMS[self.home_selected]),
            KeyCode::Char('q') | KeyCode::Esc => self.ask_quit(),
            _ => {}
        }
    }

    fn activate_home_item(&mut self, item: HomeItem) {
        match item {
            HomeItem::Notes => self.navigate(AppState::Notes),
            HomeItem::Transcribe => self.navigate(AppState::Transcribe),
            HomeItem::Quizzes => self.navigate(AppState::Quizzes),
            HomeItem::Analytics => self.navigate(AppState::Analytics),
            HomeItem::Theme => {
                self.theme.cycle();
                let mode = self.theme.mode().as_str();
                self.toast(ToastKind::Info, format!("Theme set to {}", mode));
            }
            HomeItem::SignOut => {
                self.busy = Some("Signing out...".to_string());
                self.request(ApiRequest::SignOut);
            }
        }
    }

    // Notes

    fn handle_notes_input(&mut self, key: KeyEvent) {
        if self.search_active {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.search_active = false,
                _ => {
                    if self.search.handle_key(key) {
                        let query = self.search.value().to_string();
                        self.notes.set_query(&query);
                    }
                }
            }
            return;
        }
        match key.code {
            KeyCode::Esc => self.navigate(AppState::Home),
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Up => self.notes.select_previous(),
            KeyCode::Down => self.notes.select_next(),
            KeyCode::Left => self.notes.previous_page(),
            KeyCode::Right => self.notes.next_page(),
            KeyCode::Char('n') => self.open_editor(SourceKind::Note, None, AppState::Notes),
            KeyCode::Char('r') => self.request(ApiRequest::LoadNotes),
            KeyCode::Enter => {
                if let Some(note) = self.notes.selected().cloned() {
                    self.open_viewer(Viewing {
                        kind: SourceKind::Note,
                        id: note.id,
                        title: note.title,
                        content: note.content,
                        date: note.date,
                        return_to: AppState::Notes,
                    });
                }
            }
            KeyCode::Char('e') => {
                if let Some(note) = self.notes.selected().cloned() {
                    self.open_editor(
                        SourceKind::Note,
                        Some((note.id, note.title, note.content)),
                        AppState::Notes,
                    );
                }
            }
            KeyCode::Char('d') => {
                if let Some(note) = self.notes.selected() {
                    self.delete_target = Some(DeleteTarget {
                        kind: SourceKind::Note,
                        title: note.title.clone(),
                        return_to: AppState::Notes,
                    });
                    self.state = AppState::DeleteConfirm;
                }
            }
            KeyCode::Char('z') => {
                if let Some(title) = self.notes.selected().map(|n| n.title.clone()) {
                    self.take_quiz(SourceKind::Note, title);
                }
            }
            _ => {}
        }
    }

    fn open_viewer(&mut self, viewing: Viewing) {
        self.viewing = Some(viewing);
        self.view_scroll = 0;
        self.state = AppState::NoteView;
    }

    fn open_editor(
        &mut self,
        kind: SourceKind,
        existing: Option<(String, String, String)>,
        return_to: AppState,
    ) {
        let (id, title, content) = match existing {
            Some((id, title, content)) => (Some(id), title, content),
            None => (None, String::new(), String::new()),
        };
        let mut content_input = TextInput::multiline();
        content_input.set(&content);
        self.editor = Some(NoteEditor {
            kind,
            id,
            title: TextInput::with_value(&title),
            content: content_input,
            focus: EditorFocus::Title,
            preview: false,
            return_to,
        });
        self.state = AppState::NoteEditor;
    }

    fn handle_view_input(&mut self, key: KeyEvent) {
        let Some(viewing) = self.viewing.clone() else {
            self.state = AppState::Notes;
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.viewing = None;
                self.state = viewing.return_to;
            }
            KeyCode::Up => self.view_scroll = self.view_scroll.saturating_sub(1),
            KeyCode::Down => self.view_scroll = self.view_scroll.saturating_add(1),
            KeyCode::PageUp => self.view_scroll = self.view_scroll.saturating_sub(10),
            KeyCode::PageDown => self.view_scroll = self.view_scroll.saturating_add(10),
            KeyCode::Char('e') => {
                self.viewing = None;
                self.open_editor(
                    viewing.kind,
                    Some((viewing.id, viewing.title, viewing.content)),
                    viewing.return_to,
                );
            }
            KeyCode::Char('z') => {
                self.viewing = None;
                self.take_quiz(viewing.kind, viewing.title);
            }
            _ => {}
        }
    }

    fn handle_editor_input(&mut self, key: KeyEvent) {
        let Some(editor) = self.editor.as_mut() else {
            self.state = AppState::Notes;
            return;
        };
        if is_ctrl(&key, 's') {
            return self.save_editor();
        }
        if is_ctrl(&key, 'p') {
            editor.preview = !editor.preview;
            return;
        }
        match key.code {
            KeyCode::Esc => {
                let return_to = editor.return_to;
                self.editor = None;
                self.state = return_to;
            }
            KeyCode::Tab | KeyCode::BackTab => {
                editor.focus = match editor.focus {
                    EditorFocus::Title => EditorFocus::Content,
                    EditorFocus::Content => EditorFocus::Title,
                };
            }
            KeyCode::Enter if editor.focus == EditorFocus::Title => {
                editor.focus = EditorFocus::Content;
            }
            _ if editor.preview => {}
            _ => {
                let input = match editor.focus {
                    EditorFocus::Title => &mut editor.title,
                    EditorFocus::Content => &mut editor.content,
                };
                input.handle_key(key);
            }
        }
    }

    fn save_editor(&mut self) {
        let Some(editor) = self.editor.as_ref() else {
            return;
        };
        let draft = editor.draft();
        let id = editor.id.clone();
        let kind = editor.kind;
        let request = match id {
            None => match self.notes.begin_create(&draft) {
                Err(e) => return self.toast_error(&e),
                Ok(None) => {
                    logger::log("Save already in progress, ignoring duplicate call");
                    return;
                }
                Ok(Some(draft)) => ApiRequest::CreateNote { draft },
            },
            Some(id) => {
                if self.busy.is_some() {
                    return;
                }
                let draft = match crate::notes::prepare_draft(&draft) {
                    Ok(draft) => draft,
                    Err(e) => return self.toast_error(&e),
                };
                match kind {
                    SourceKind::Note => ApiRequest::UpdateNote { id, draft },
                    SourceKind::Transcript => ApiRequest::UpdateTranscript { id, draft },
                }
            }
        };
        self.busy = Some("Saving...".to_string());
        self.request(request);
    }

    fn handle_delete_input(&mut self, key: KeyEvent) {
        let Some(target) = self.delete_target.clone() else {
            self.state = AppState::Notes;
            return;
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                let request = match target.kind {
                    SourceKind::Note => ApiRequest::DeleteNote {
                        title: target.title.clone(),
                    },
                    SourceKind::Transcript => ApiRequest::DeleteTranscript {
                        title: target.title.clone(),
                    },
                };
                self.busy = Some("Deleting...".to_string());
                self.request(request);
                self.delete_target = None;
                self.state = target.return_to;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.delete_target = None;
                self.state = target.return_to;
            }
            _ => {}
        }
    }

    // Transcribe

    fn handle_transcribe_input(&mut self, key: KeyEvent) {
        if is_ctrl(&key, 'r') {
            match self.recorder.state() {
                RecorderState::Idle => {
                    self.recorder.start();
                    self.transcribe_focus = TranscribeFocus::Dictation;
                    self.toast(ToastKind::Info, "Recording started");
                }
                RecorderState::Recording | RecorderState::Paused => {
                    self.recorder.stop();
                    self.toast(ToastKind::Info, "Recording stopped");
                }
            }
            return;
        }
        if is_ctrl(&key, 'p') {
            match self.recorder.state() {
                RecorderState::Recording => self.recorder.pause(),
                RecorderState::Paused => self.recorder.resume(),
                RecorderState::Idle => {}
            }
            return;
        }
        if is_ctrl(&key, 's') {
            return self.save_transcript();
        }
        if is_ctrl(&key, 'l') {
            self.recorder.clear();
            self.transcript_title.clear();
            return;
        }

        match key.code {
            KeyCode::Esc => return self.navigate(AppState::Home),
            KeyCode::Tab => {
                self.transcribe_focus = cycle(&TRANSCRIBE_ORDER, self.transcribe_focus, true);
                return;
            }
            KeyCode::BackTab => {
                self.transcribe_focus = cycle(&TRANSCRIBE_ORDER, self.transcribe_focus, false);
                return;
            }
            _ => {}
        }

        match self.transcribe_focus {
            TranscribeFocus::Title => {
                self.transcript_title.handle_key(key);
            }
            TranscribeFocus::Dictation => match key.code {
                KeyCode::Char(c) => {
                    self.recorder.dictate(&c.to_string());
                }
                KeyCode::Enter => {
                    self.recorder.dictate("\n");
                }
                KeyCode::Backspace => self.recorder.backspace(),
                _ => {}
            },
            TranscribeFocus::Saved => self.handle_saved_transcripts_input(key),
        }
    }

    fn handle_saved_transcripts_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.transcripts.select_previous(),
            KeyCode::Down => self.transcripts.select_next(),
            KeyCode::Left => self.transcripts.previous_page(),
            KeyCode::Right => self.transcripts.next_page(),
            KeyCode::Enter => {
                if let Some(t) = self.transcripts.selected().cloned() {
                    self.open_viewer(Viewing {
                        kind: SourceKind::Transcript,
                        date: crate::utils::format_date(&t.created_at),
                        id: t.id,
                        title: t.title,
                        content: t.content,
                        return_to: AppState::Transcribe,
                    });
                }
            }
            KeyCode::Char('e') => {
                if let Some(t) = self.transcripts.selected().cloned() {
                    self.open_editor(
                        SourceKind::Transcript,
                        Some((t.id, t.title, t.content)),
                        AppState::Transcribe,
                    );
                }
            }
            KeyCode::Char('d') => {
                if let Some(t) = self.transcripts.selected() {
                    self.delete_target = Some(DeleteTarget {
                        kind: SourceKind::Transcript,
                        title: t.title.clone(),
                        return_to: AppState::Transcribe,
                    });
                    self.state = AppState::DeleteConfirm;
                }
            }
            KeyCode::Char('z') => {
                if let Some(title) = self.transcripts.selected().map(|t| t.title.clone()) {
                    self.take_quiz(SourceKind::Transcript, title);
                }
            }
            _ => {}
        }
    }

    fn save_transcript(&mut self) {
        if self.busy.is_some() {
            return;
        }
        let title = self.transcript_title.value().to_string();
        let content = self.recorder.transcript().to_string();
        if let Err(e) = crate::transcribe::validate_transcript(&title, &content) {
            return self.toast_error(&e);
        }
        if self.recorder.state() != RecorderState::Idle {
            self.recorder.stop();
        }
        self.busy = Some("Saving transcript...".to_string());
        self.request(ApiRequest::SaveTranscript { title, content });
    }

    // Quizzes

    /// Generate a quiz straight from a note or transcript.
    fn take_quiz(&mut self, kind: SourceKind, title: String) {
        self.state = AppState::Quizzes;
        let count = self.question_count;
        self.start_generation(QuizSource { kind, title }, count);
    }

    fn start_generation(&mut self, source: QuizSource, question_count: u32) {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.generating = Some(Generating {
            ticket,
            title: source.title.clone(),
        });
        self.request(ApiRequest::GenerateQuiz {
            ticket,
            source,
            question_count,
        });
    }

    pub fn cancel_generation(&mut self) {
        if let Some(generating) = self.generating.take() {
            logger::log(&format!("Cancelled quiz generation {}", generating.ticket));
            self.toast(ToastKind::Info, "Quiz generation cancelled");
        }
    }

    fn handle_quizzes_input(&mut self, key: KeyEvent) {
        if self.generating.is_some() {
            if key.code == KeyCode::Esc {
                self.cancel_generation();
            }
            return;
        }
        let source_count = self.notes.all().len();
        match key.code {
            KeyCode::Esc => self.navigate(AppState::Home),
            KeyCode::Up => self.picker_selected = self.picker_selected.saturating_sub(1),
            KeyCode::Down => {
                if self.picker_selected + 1 < source_count {
                    self.picker_selected += 1;
                }
            }
            KeyCode::Left => self.picker_count = self.picker_count.saturating_sub(1),
            KeyCode::Right => {
                self.picker_count = (self.picker_count + 1).min(QUESTION_COUNT_CHOICES.len() - 1);
            }
            KeyCode::Char('r') => self.request(ApiRequest::LoadNotes),
            KeyCode::Enter => {
                let Some(note) = self.notes.all().get(self.picker_selected) else {
                    self.toast(ToastKind::Error, "Please select a source note");
                    return;
                };
                let source = QuizSource {
                    kind: SourceKind::Note,
                    title: note.title.clone(),
                };
                let count = self.question_count();
                self.start_generation(source, count);
            }
            _ => {}
        }
    }

    fn reset_option_cursor(&mut self) {
        self.option_cursor = self
            .quiz
            .current_question()
            .and_then(|q| self.quiz.selected_option(q.id))
            .unwrap_or(0);
    }

    fn handle_quiz_input(&mut self, key: KeyEvent) {
        let Some(question) = self.quiz.current_question().cloned() else {
            self.state = AppState::Quizzes;
            return;
        };
        let option_count = question.options.len();
        match key.code {
            KeyCode::Esc => {
                self.quiz.exit();
                self.state = AppState::Quizzes;
            }
            KeyCode::Up => self.option_cursor = self.option_cursor.saturating_sub(1),
            KeyCode::Down => {
                self.option_cursor = (self.option_cursor + 1).min(option_count - 1);
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.choose_option(question.id, self.option_cursor);
            }
            KeyCode::Char(c @ '1'..='9') => {
                self.choose_option(question.id, c as usize - '1' as usize);
            }
            KeyCode::Char(c @ 'a'..='f') => {
                self.choose_option(question.id, c as usize - 'a' as usize);
            }
            KeyCode::Left | KeyCode::Char('p') => {
                self.quiz.previous();
                self.reset_option_cursor();
            }
            KeyCode::Right | KeyCode::Char('n') => self.next_question(),
            KeyCode::Tab => {
                // Jump to the next unanswered question after the current one.
                let current = self.quiz.current_index().unwrap_or(0);
                let questions = self.quiz.questions();
                let target = (1..questions.len())
                    .map(|offset| (current + offset) % questions.len())
                    .find(|i| !self.quiz.is_answered(questions[*i].id));
                if let Some(target) = target {
                    self.quiz.jump_to(target);
                    self.reset_option_cursor();
                }
            }
            KeyCode::Home => {
                self.quiz.jump_to(0);
                self.reset_option_cursor();
            }
            KeyCode::End => {
                let last = self.quiz.questions().len().saturating_sub(1);
                self.quiz.jump_to(last);
                self.reset_option_cursor();
            }
            _ => {}
        }
    }

    fn choose_option(&mut self, question_id: u32, option: usize) {
        if self.quiz.answer(question_id, option).is_ok() {
            self.option_cursor = option;
        }
    }

    fn next_question(&mut self) {
        if !self.quiz.current_is_answered() {
            self.toast(ToastKind::Warning, "Please select an answer first");
            return;
        }
        match self.quiz.next() {
            Some(report) => {
                logger::log(&format!(
                    "Quiz finished: {} scored {}%",
                    report.title, report.score
                ));
                self.results_scroll = 0;
                self.state = AppState::QuizResults;
                self.request(ApiRequest::SubmitScore(report));
            }
            None => self.reset_option_cursor(),
        }
    }

    fn handle_results_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('r') => {
                self.quiz.retake();
                self.option_cursor = 0;
                self.state = AppState::Quiz;
            }
            KeyCode::Up => self.results_scroll = self.results_scroll.saturating_sub(1),
            KeyCode::Down => self.results_scroll = self.results_scroll.saturating_add(1),
            KeyCode::Char('a') => {
                self.quiz.exit();
                self.navigate(AppState::Analytics);
            }
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('m') => {
                self.quiz.exit();
                self.state = AppState::Quizzes;
            }
            _ => {}
        }
    }

    // Analytics

    fn handle_analytics_input(&mut self, key: KeyEvent) {
        let now = chrono::Utc::now();
        match key.code {
            KeyCode::Esc => self.navigate(AppState::Home),
            KeyCode::Char('r') => self.navigate(AppState::Analytics),
            KeyCode::Tab | KeyCode::Char('t') => {
                if let AnalyticsStatus::Ready(view) = &mut self.analytics {
                    let next = view.range().next();
                    view.set_range(next);
                }
            }
            KeyCode::Left => {
                if let AnalyticsStatus::Ready(view) = &mut self.analytics {
                    view.previous_page(now);
                }
            }
            KeyCode::Right => {
                if let AnalyticsStatus::Ready(view) = &mut self.analytics {
                    view.next_page(now);
                }
            }
            _ => {}
        }
    }

    // Responses

    pub fn handle_response(&mut self, response: ApiResponse) {
        match response {
            ApiResponse::Session(user) => {
                self.user = user;
                self.state = if self.user.is_some() {
                    AppState::Home
                } else {
                    AppState::SignIn
                };
            }
            ApiResponse::SignedIn { outcome, user } => {
                self.busy = None;
                if outcome.success {
                    self.user = user;
                    self.sign_in = SignInForm::default();
                    self.toast(ToastKind::Success, outcome.message);
                    self.navigate(AppState::Home);
                } else {
                    self.sign_in.password.clear();
                    self.sign_in.message = Some(outcome.message);
                }
            }
            ApiResponse::SignUpStarted(result) => {
                self.busy = None;
                match result {
                    Ok(message) => {
                        self.pending_email = Some(self.sign_up.email.value().trim().to_string());
                        self.verify = SimpleForm::with_input(TextInput::code(OTP_LENGTH));
                        self.toast(ToastKind::Success, message);
                        self.state = AppState::VerifyEmail;
                    }
                    Err(e) => self.sign_up.message = Some(e.user_message()),
                }
            }
            ApiResponse::SignUpVerified { result, user } => {
                self.busy = None;
                match result {
                    Ok(message) => {
                        self.user = user;
                        self.pending_email = None;
                        self.sign_up = SignUpForm::default();
                        self.toast(ToastKind::Success, message);
                        self.navigate(AppState::Home);
                    }
                    Err(e) => {
                        self.verify.input.clear();
                        self.verify.message = Some(e.user_message());
                    }
                }
            }
            ApiResponse::OtpResent(result) => {
                self.busy = None;
                match result {
                    Ok(message) => self.toast(ToastKind::Success, message),
                    Err(e) => self.toast_error(&e),
                }
            }
            ApiResponse::SignedOut => {
                self.busy = None;
                self.clear_user_data();
                self.toast(ToastKind::Info, "Signed out");
                self.state = AppState::SignIn;
            }
            ApiResponse::ResetCodeSent { email, result } => {
                self.busy = None;
                match result {
                    Ok(message) => {
                        self.reset = ResetForm {
                            email,
                            ..ResetForm::default()
                        };
                        self.toast(ToastKind::Success, message);
                        self.state = AppState::ResetPassword;
                    }
                    Err(e) => self.forgot.message = Some(e.user_message()),
                }
            }
            ApiResponse::PasswordReset(result) => {
                self.busy = None;
                match result {
                    Ok(message) => {
                        let email = self.reset.email.clone();
                        self.sign_in = SignInForm {
                            email: TextInput::with_value(&email),
                            focus: SignInFocus::Password,
                            ..SignInForm::default()
                        };
                        self.toast(ToastKind::Success, message);
                        self.state = AppState::SignIn;
                    }
                    Err(e) => self.reset.message = Some(e.user_message()),
                }
            }
            ApiResponse::NotesLoaded(result) => match result {
                Ok(notes) => {
                    self.notes.set_notes(notes);
                    let count = self.notes.all().len();
                    if self.picker_selected >= count {
                        self.picker_selected = count.saturating_sub(1);
                    }
                }
                Err(e) => {
                    logger::error(&format!("Error fetching notes: {}", e));
                    self.toast(ToastKind::Error, "Failed to load notes");
                }
            },
            ApiResponse::NoteCreated(result) => {
                self.busy = None;
                self.notes.finish_create();
                self.finish_mutation(result, AppState::Notes, ApiRequest::LoadNotes);
            }
            ApiResponse::NoteUpdated(result) => {
                self.busy = None;
                self.finish_mutation(result, AppState::Notes, ApiRequest::LoadNotes);
            }
            ApiResponse::NoteDeleted(result) => {
                self.busy = None;
                self.finish_mutation(result, AppState::Notes, ApiRequest::LoadNotes);
            }
            ApiResponse::TranscriptsLoaded(result) => match result {
                Ok(transcripts) => self.transcripts.set_items(transcripts),
                Err(e) => logger::error(&format!("Error fetching transcripts: {}", e)),
            },
            ApiResponse::TranscriptSaved(result) => {
                self.busy = None;
                match result {
                    Ok(message) => {
                        self.recorder.clear();
                        self.transcript_title.clear();
                        self.toast(ToastKind::Success, message);
                        self.request(ApiRequest::LoadTranscripts);
                    }
                    Err(e) => self.toast_error(&e),
                }
            }
            ApiResponse::TranscriptUpdated(result) | ApiResponse::TranscriptDeleted(result) => {
                self.busy = None;
                self.finish_mutation(result, AppState::Transcribe, ApiRequest::LoadTranscripts);
            }
            ApiResponse::QuizGenerated { ticket, result } => {
                self.handle_generated_quiz(ticket, result);
            }
            ApiResponse::ScoreSubmitted(result) => match result {
                Ok(()) => self.toast(ToastKind::Success, "Quiz score saved!"),
                Err(e) => self.toast(
                    ToastKind::Warning,
                    format!("Failed to save quiz score: {}", e.user_message()),
                ),
            },
            ApiResponse::AnalyticsLoaded(result) => {
                self.analytics = match result {
                    Ok(results) => AnalyticsStatus::Ready(AnalyticsView::new(results)),
                    Err(e) => {
                        logger::error(&format!("Error fetching quiz data: {}", e));
                        AnalyticsStatus::Failed(e.user_message())
                    }
                };
            }
        }
    }

    /// Shared tail of every note/transcript mutation: on success close the
    /// editor, notify and refetch; on failure notify and keep local state.
    fn finish_mutation(
        &mut self,
        result: crate::error::Result<String>,
        list_state: AppState,
        reload: ApiRequest,
    ) {
        match result {
            Ok(message) => {
                if self.state == AppState::NoteEditor {
                    let return_to = self.editor.as_ref().map_or(list_state, |e| e.return_to);
                    self.editor = None;
                    self.state = return_to;
                }
                self.toast(ToastKind::Success, message);
                self.request(reload);
            }
            Err(e) => self.toast_error(&e),
        }
    }

    fn handle_generated_quiz(&mut self, ticket: u64, result: crate::error::Result<crate::models::Quiz>) {
        if self.generating.as_ref().map(|g| g.ticket) != Some(ticket) {
            logger::log(&format!("Ignoring response for cancelled quiz request {}", ticket));
            return;
        }
        self.generating = None;
        match result {
            Ok(quiz) => {
                let count = quiz.questions.len();
                self.quiz.start(quiz);
                self.option_cursor = 0;
                self.toast(
                    ToastKind::Success,
                    format!(
                        "AI Quiz generated successfully! {} questions created.",
                        count
                    ),
                );
                if self.state == AppState::Quizzes {
                    self.state = AppState::Quiz;
                }
            }
            Err(e) => {
                let reason = match &e {
                    AppError::Parse(_) => "Failed to parse quiz data".to_string(),
                    other => other.user_message(),
                };
                self.toast(
                    ToastKind::Error,
                    format!("Failed to generate quiz: {}", reason),
                );
            }
        }
    }

    fn clear_user_data(&mut self) {
        self.user = None;
        self.pending_email = None;
        self.sign_in = SignInForm::default();
        self.sign_up = SignUpForm::default();
        self.notes.set_notes(Vec::new());
        self.notes.set_query("");
        self.search.clear();
        self.viewing = None;
        self.editor = None;
        self.delete_target = None;
        self.recorder.clear();
        self.transcript_title.clear();
        self.transcripts.set_items(Vec::new());
        self.generating = None;
        self.quiz.reset();
        self.analytics = AnalyticsStatus::Loading;
        self.home_selected = 0;
    }

    pub fn quiz_phase(&self) -> &QuizPhase {
        self.quiz.phase()
    }
}
