//! Screen flow between menus and play, as an explicit transition table.

use crate::game::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    MainMenu,
    SettingsMenu,
    ChartSelectMenu,
    DifficultySelectMenu,
    Playing,
    Paused,
    EndScreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenEvent {
    Play,
    OpenSettings,
    ChartChosen,
    DifficultyChosen,
    /// Escape: step back one screen, or pause/unpause during play.
    Back,
    Pause,
    Resume,
    Retry,
    Leave,
    ChartFinished,
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    None,
    Navigate(GameState),
    Exit,
}

/// Next state for `event` in `state`, or `None` when the event does not apply.
pub const fn transition(state: GameState, event: ScreenEvent) -> Option<GameState> {
    use GameState as S;
    use ScreenEvent as E;
    let next = match (state, event) {
        (S::MainMenu, E::Play) => S::ChartSelectMenu,
        (S::MainMenu, E::OpenSettings) => S::SettingsMenu,
        (S::SettingsMenu, E::Back) => S::MainMenu,
        (S::ChartSelectMenu, E::ChartChosen) => S::DifficultySelectMenu,
        (S::ChartSelectMenu, E::Back) => S::MainMenu,
        (S::DifficultySelectMenu, E::DifficultyChosen) => S::Playing,
        (S::DifficultySelectMenu, E::Back) => S::ChartSelectMenu,
        (S::Playing, E::Pause | E::Back) => S::Paused,
        (S::Playing, E::ChartFinished) => S::EndScreen,
        (S::Paused, E::Resume | E::Back | E::Retry) => S::Playing,
        (S::Paused, E::Leave) => S::MainMenu,
        (S::EndScreen, E::Retry) => S::Playing,
        (S::EndScreen, E::Continue | E::Back) => S::ChartSelectMenu,
        _ => return None,
    };
    Some(next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Main,
    Pause,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Play,
    Settings,
    Quit,
    Resume,
    Retry,
    Leave,
    NoteSpeed,
    BackgroundDim,
    Volume,
    Back,
}

const MAIN_ITEMS: [MenuItem; 3] = [MenuItem::Play, MenuItem::Settings, MenuItem::Quit];
const PAUSE_ITEMS: [MenuItem; 3] = [MenuItem::Resume, MenuItem::Retry, MenuItem::Leave];
const SETTINGS_ITEMS: [MenuItem; 4] = [
    MenuItem::NoteSpeed,
    MenuItem::BackgroundDim,
    MenuItem::Volume,
    MenuItem::Back,
];

impl MenuKind {
    pub const fn items(self) -> &'static [MenuItem] {
        match self {
            Self::Main => &MAIN_ITEMS,
            Self::Pause => &PAUSE_ITEMS,
            Self::Settings => &SETTINGS_ITEMS,
        }
    }

    /// The state this menu is drawn in.
    pub const fn state(self) -> GameState {
        match self {
            Self::Main => GameState::MainMenu,
            Self::Pause => GameState::Paused,
            Self::Settings => GameState::SettingsMenu,
        }
    }
}

impl MenuItem {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Settings => "Settings",
            Self::Quit => "Quit",
            Self::Resume => "Resume",
            Self::Retry => "Retry",
            Self::Leave => "Leave",
            Self::NoteSpeed => "Note Speed",
            Self::BackgroundDim => "Background Dim",
            Self::Volume => "Volume",
            Self::Back => "Back",
        }
    }

    const fn event(self) -> Option<ScreenEvent> {
        match self {
            Self::Play => Some(ScreenEvent::Play),
            Self::Settings => Some(ScreenEvent::OpenSettings),
            Self::Resume => Some(ScreenEvent::Resume),
            Self::Retry => Some(ScreenEvent::Retry),
            Self::Leave => Some(ScreenEvent::Leave),
            Self::Back => Some(ScreenEvent::Back),
            Self::Quit | Self::NoteSpeed | Self::BackgroundDim | Self::Volume => None,
        }
    }
}

/// Selection index that wraps at both ends. Also used for chart and
/// difficulty lists, whose length is only known at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuCursor {
    index: usize,
    len: usize,
}

impl MenuCursor {
    pub const fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub const fn for_menu(kind: MenuKind) -> Self {
        Self::new(kind.items().len())
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.index
    }

    pub fn next(&mut self) {
        if self.len != 0 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len != 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Menu {
    pub kind: MenuKind,
    pub cursor: MenuCursor,
}

impl Menu {
    pub const fn new(kind: MenuKind) -> Self {
        Self { kind, cursor: MenuCursor::for_menu(kind) }
    }

    pub fn selected(&self) -> MenuItem {
        self.kind.items()[self.cursor.index()]
    }

    /// Enter on the highlighted item. The cursor returns to the top whenever
    /// the menu is left.
    pub fn activate(&mut self) -> ScreenAction {
        let item = self.selected();
        if item == MenuItem::Quit {
            return ScreenAction::Exit;
        }
        let next = match item.event() {
            Some(event) => transition(self.kind.state(), event),
            None => None,
        };
        match next {
            Some(state) => {
                self.cursor.reset();
                ScreenAction::Navigate(state)
            }
            None => ScreenAction::None,
        }
    }

    /// Left/right on a settings row. Other rows ignore it.
    pub fn adjust(&self, settings: &mut Settings, increase: bool) {
        match (self.selected(), increase) {
            (MenuItem::NoteSpeed, true) => settings.increment_note_speed(),
            (MenuItem::NoteSpeed, false) => settings.decrement_note_speed(),
            (MenuItem::BackgroundDim, true) => settings.increment_background_dim(),
            (MenuItem::BackgroundDim, false) => settings.decrement_background_dim(),
            (MenuItem::Volume, true) => settings.increment_volume(),
            (MenuItem::Volume, false) => settings.decrement_volume(),
            _ => {}
        }
    }
}
