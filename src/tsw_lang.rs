// Interface strings
// English and Chinese text for every label the terminal UI draws

#[derive(Clone)]
pub struct Assets {
    // Menu items
    pub menu_help: &'static str,
    pub menu_start: &'static str,
    pub menu_difficulty: &'static str,
    pub menu_reveal_all: &'static str,
    pub menu_exit: &'static str,

    // Difficulty names
    pub diff_beginner: &'static str,
    pub diff_intermediate: &'static str,
    pub diff_expert: &'static str,
    pub diff_custom: &'static str,
    pub diff_board_fmt: &'static str, // "{}x{}, {} mines"
    pub diff_invalid_title: &'static str,

    // Status bar
    pub status_mines_fmt: &'static str, // " Mines: {}   Time: {} "
    pub state_idle: &'static str,
    pub state_playing: &'static str,
    pub state_won: &'static str,
    pub state_lost: &'static str,

    // Help modal
    pub help_controls: &'static str,
    pub help_move: &'static str,
    pub help_reveal: &'static str,
    pub help_flag: &'static str,
    pub help_chord: &'static str,
    pub help_start: &'static str,

    // Win/Loss modals
    pub win_title: &'static str,
    pub win_message: &'static str,
    pub win_time_fmt: &'static str, // "Time: {} seconds"
    pub loss_title: &'static str,
    pub loss_message: &'static str,

    pub btn_close: &'static str,

    // Terminal size messages
    pub tsmsg_line1: &'static str,
    pub tsmsg_line2: &'static str, // "Minimum required: {} x {}"
    pub tsmsg_title: &'static str,
}

/// Returns English language assets
pub fn english_assets() -> Assets {
    Assets {
        menu_help: "Help",
        menu_start: "Start",
        menu_difficulty: "Difficulty",
        menu_reveal_all: "Reveal All",
        menu_exit: "Exit",

        diff_beginner: "Beginner",
        diff_intermediate: "Intermediate",
        diff_expert: "Expert",
        diff_custom: "Custom",
        diff_board_fmt: "{}x{}, {} mines",
        diff_invalid_title: "Invalid board",

        status_mines_fmt: " Mines: {}   Time: {} ",
        state_idle: "F2 to start",
        state_playing: "Playing",
        state_won: "Cleared!",
        state_lost: "Boom",

        help_controls: " Controls:",
        help_move: "  Mouse | Arrows      - move cursor",
        help_reveal: "  L-Click | Space     - reveal",
        help_flag: "  R-Click | F         - toggle flag",
        help_chord: "  Hold R + L-Click | Enter - chord",
        help_start: "  F2 - start a new game",

        win_title: "Success",
        win_message: "Mines cleared, you win!",
        win_time_fmt: "Time: {} seconds",
        loss_title: "Failure",
        loss_message: "You stepped on a mine.",

        btn_close: " CLOSE ",

        tsmsg_line1: "Terminal size too small.",
        tsmsg_line2: "Minimum required: {} x {}",
        tsmsg_title: "Resize Terminal",
    }
}

/// Returns Chinese language assets
pub fn chinese_assets() -> Assets {
    Assets {
        menu_help: "帮助",
        menu_start: "开始",
        menu_difficulty: "难度",
        menu_reveal_all: "全部翻开",
        menu_exit: "退出",

        diff_beginner: "初级",
        diff_intermediate: "中级",
        diff_expert: "高级",
        diff_custom: "自定义",
        diff_board_fmt: "{}x{}，{} 个雷",
        diff_invalid_title: "无效的雷区",

        status_mines_fmt: " 剩余雷数：{}   用时：{} ",
        state_idle: "按 F2 开始",
        state_playing: "进行中",
        state_won: "扫雷成功！",
        state_lost: "踩雷了",

        help_controls: " 操作：",
        help_move: "  鼠标 | 方向键          - 移动光标",
        help_reveal: "  左键 | 空格            - 翻开",
        help_flag: "  右键 | F               - 插旗/拔旗",
        help_chord: "  按住右键 + 左键 | 回车 - 双击翻开",
        help_start: "  F2 - 开始新游戏",

        win_title: "成功",
        win_message: "恭喜，全部雷已排除！",
        win_time_fmt: "用时：{} 秒",
        loss_title: "失败",
        loss_message: "你踩到雷了。",

        btn_close: " 关闭 ",

        tsmsg_line1: "终端屏幕布局过小",
        tsmsg_line2: "最小需要尺寸：{} x {}",
        tsmsg_title: "需要调整大小",
    }
}

/// Active language and its strings
pub struct Lang {
    pub assets: Assets,
}

impl Lang {
    /// Normalizes the code ("zh-CN" → "zh"); anything unsupported falls back to English
    pub fn new(lang_code: &str) -> Self {
        let assets = if lang_code.to_lowercase().starts_with("zh") {
            chinese_assets()
        } else {
            english_assets()
        };

        Lang { assets }
    }

    /// Localized difficulty name by picker index (0=Beginner .. 3=Custom)
    pub fn diff_name(&self, index: usize) -> &'static str {
        match index {
            0 => self.assets.diff_beginner,
            1 => self.assets.diff_intermediate,
            2 => self.assets.diff_expert,
            _ => self.assets.diff_custom,
        }
    }
}

/// Substitute each `{}` in `fmt` with the next argument
pub fn fill(fmt: &str, args: &[&dyn std::fmt::Display]) -> String {
    let mut out = fmt.to_string();
    for arg in args {
        out = out.replacen("{}", &arg.to_string(), 1);
    }
    out
}
