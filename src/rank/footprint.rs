use crate::error::{Axis, RankFilterError};
use crate::rank::structuring_element::StructuringElement;
use itertools::iproduct;

/// 基準点からの相対位置 (dy, dx)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Offset {
    /// 行方向の相対位置
    pub dy: i32,
    /// 列方向の相対位置
    pub dx: i32,
}

impl Offset {
    #[inline]
    pub const fn new(dy: i32, dx: i32) -> Self {
        Self { dy, dx }
    }
}

/// ウィンドウ中心の移動方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// 右へ1列
    East,
    /// 左へ1列
    West,
    /// 下へ1行
    South,
}

impl Step {
    /// 移動量 (dy, dx)
    #[inline]
    const fn delta(self) -> Offset {
        match self {
            Self::East => Offset::new(0, 1),
            Self::West => Offset::new(0, -1),
            Self::South => Offset::new(1, 0),
        }
    }
}

/// 1ステップ分の差分更新リスト
///
/// どちらのリストも移動 *後* の中心からの相対位置で表されます。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepUpdate {
    /// 新たにウィンドウへ入る位置
    pub entering: Vec<Offset>,
    /// ウィンドウから出る位置
    pub leaving: Vec<Offset>,
}

/// 構造要素から導出した不変の走査計画
///
/// 近傍に属する全オフセットと、各移動方向の差分リストを保持します。
/// 一度だけ計算され、全ての行で同じものが再生されます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePlan {
    offsets: Vec<Offset>,
    east: StepUpdate,
    west: StepUpdate,
    south: StepUpdate,
}

impl UpdatePlan {
    /// 構造要素とシフト量から走査計画を作成します
    ///
    /// # 引数
    ///
    /// * `selem` - 構造要素
    /// * `shift_x` - 基準点の列方向シフト（偶数幅のみ 0 または 1）
    /// * `shift_y` - 基準点の行方向シフト（偶数高さのみ 0 または 1）
    ///
    /// # エラー
    ///
    /// * `RankFilterError::EmptyStructuringElement` - 幅または高さが0の場合
    /// * `RankFilterError::InvalidShift` - シフトが範囲外の場合
    pub fn new(
        selem: &StructuringElement,
        shift_x: i32,
        shift_y: i32,
    ) -> Result<Self, RankFilterError> {
        let (width, height) = selem.dimensions();
        if width == 0 || height == 0 {
            return Err(RankFilterError::EmptyStructuringElement { width, height });
        }

        let centre_x = reference_index(width, shift_x, Axis::X)?;
        let centre_y = reference_index(height, shift_y, Axis::Y)?;

        // 行優先の順序でオフセットを列挙
        let offsets: Vec<Offset> = iproduct!(0..height, 0..width)
            .filter(|&(y, x)| selem.contains(x, y))
            .map(|(y, x)| Offset::new(y as i32 - centre_y, x as i32 - centre_x))
            .collect();

        let member = |o: Offset| {
            let x = o.dx + centre_x;
            let y = o.dy + centre_y;
            x >= 0 && y >= 0 && selem.contains(x as u32, y as u32)
        };

        let derive = |step: Step| {
            let d = step.delta();
            // entering: o + d が近傍に含まれない o
            let entering = offsets
                .iter()
                .copied()
                .filter(|o| !member(Offset::new(o.dy + d.dy, o.dx + d.dx)))
                .collect();
            // leaving: o - d が近傍に含まれない o を新しい中心基準に変換
            let leaving = offsets
                .iter()
                .map(|o| Offset::new(o.dy - d.dy, o.dx - d.dx))
                .filter(|&o| !member(o))
                .collect();
            StepUpdate { entering, leaving }
        };

        let east = derive(Step::East);
        let west = derive(Step::West);
        let south = derive(Step::South);

        tracing::trace!(
            offsets = offsets.len(),
            east = east.entering.len(),
            south = south.entering.len(),
            "derived update plan"
        );

        Ok(Self {
            offsets,
            east,
            west,
            south,
        })
    }

    /// 近傍に属する全オフセット（行優先）
    #[inline]
    #[must_use]
    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }

    /// 指定方向の差分リスト
    #[inline]
    #[must_use]
    pub const fn step(&self, step: Step) -> &StepUpdate {
        match step {
            Step::East => &self.east,
            Step::West => &self.west,
            Step::South => &self.south,
        }
    }
}

/// シフトを検証し、基準点のインデックスを返す
fn reference_index(extent: u32, shift: i32, axis: Axis) -> Result<i32, RankFilterError> {
    let max_shift = if extent % 2 == 0 { 1 } else { 0 };
    if !(0..=max_shift).contains(&shift) {
        return Err(RankFilterError::InvalidShift {
            axis,
            shift,
            extent,
        });
    }
    Ok((extent as i32 - 1) / 2 + shift)
}
