use super::{ListVS, MapVS, PrimitiveVS, Scalar, SetVS, ValueSummary};
use crate::guard::{Guard, GuardContext};

/// A local-state field or message payload whose shape is determined by the
/// modeled program rather than by Rust generics (spec §3.3: "Local state:
/// an ordered vector of VSs (fields), addressable by field index" — fields
/// of *different* concrete types coexist in the same vector).
///
/// `ListVS`/`SetVS`/`MapVS` are generic over a concrete `ValueSummary`
/// element type, which is exactly what a statically-typed program doesn't
/// give us here; `DynValue` closes the recursion by being its own element
/// type, boxed where the container would otherwise be unbounded in size.
#[derive(Clone)]
pub enum DynValue {
    Scalar(PrimitiveVS<Scalar>),
    List(Box<ListVS<DynValue>>),
    Set(Box<SetVS<DynValue>>),
    Map(Box<MapVS<PrimitiveVS<Scalar>, DynValue>>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DynConcrete {
    Scalar(Scalar),
    List(Vec<DynConcrete>),
    Set(Vec<DynConcrete>),
    Map(Vec<(Scalar, DynConcrete)>),
}

impl DynValue {
    pub fn empty_scalar(ctx: &GuardContext) -> Self {
        DynValue::Scalar(PrimitiveVS::empty(ctx))
    }

    pub fn scalar(value: Scalar, ctx: &GuardContext) -> Self {
        DynValue::Scalar(PrimitiveVS::constant(value, ctx))
    }

    pub fn as_scalar(&self) -> Option<&PrimitiveVS<Scalar>> {
        match self {
            DynValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListVS<DynValue>> {
        match self {
            DynValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&SetVS<DynValue>> {
        match self {
            DynValue::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapVS<PrimitiveVS<Scalar>, DynValue>> {
        match self {
            DynValue::Map(v) => Some(v),
            _ => None,
        }
    }
}

impl ValueSummary for DynValue {
    type Concrete = DynConcrete;

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        match self {
            DynValue::Scalar(v) => DynValue::Scalar(v.restrict(g, ctx)),
            DynValue::List(v) => DynValue::List(Box::new(v.restrict(g, ctx))),
            DynValue::Set(v) => DynValue::Set(Box::new(v.restrict(g, ctx))),
            DynValue::Map(v) => DynValue::Map(Box::new(v.restrict(g, ctx))),
        }
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        if items.is_empty() {
            return DynValue::empty_scalar(ctx);
        }
        match &items[0] {
            DynValue::Scalar(_) => DynValue::Scalar(PrimitiveVS::merge(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        DynValue::Scalar(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
                ctx,
            )),
            DynValue::List(_) => DynValue::List(Box::new(ListVS::merge(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        DynValue::List(l) => Some(*l),
                        _ => None,
                    })
                    .collect(),
                ctx,
            ))),
            DynValue::Set(_) => DynValue::Set(Box::new(SetVS::merge(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        DynValue::Set(s) => Some(*s),
                        _ => None,
                    })
                    .collect(),
                ctx,
            ))),
            DynValue::Map(_) => DynValue::Map(Box::new(MapVS::merge(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        DynValue::Map(m) => Some(*m),
                        _ => None,
                    })
                    .collect(),
                ctx,
            ))),
        }
    }

    fn get_universe(&self) -> Guard {
        match self {
            DynValue::Scalar(v) => v.get_universe(),
            DynValue::List(v) => v.get_universe(),
            DynValue::Set(v) => v.get_universe(),
            DynValue::Map(v) => v.get_universe(),
        }
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        match (self, other) {
            (DynValue::Scalar(a), DynValue::Scalar(b)) => a.symbolic_equals(b, pc, ctx),
            (DynValue::List(a), DynValue::List(b)) => a.symbolic_equals(b, pc, ctx),
            (DynValue::Set(a), DynValue::Set(b)) => a.symbolic_equals(b, pc, ctx),
            (DynValue::Map(a), DynValue::Map(b)) => a.symbolic_equals(b, pc, ctx),
            // Shape mismatch under the same field index never happens in a
            // well-typed program; treat it as "never equal" rather than panic.
            _ => PrimitiveVS::constant(false, ctx),
        }
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)> {
        match self {
            DynValue::Scalar(v) => v
                .get_guarded_values(ctx)
                .into_iter()
                .map(|(g, s)| (g, DynConcrete::Scalar(s)))
                .collect(),
            DynValue::List(v) => v
                .get_guarded_values(ctx)
                .into_iter()
                .map(|(g, xs)| (g, DynConcrete::List(xs)))
                .collect(),
            DynValue::Set(v) => v
                .get_guarded_values(ctx)
                .into_iter()
                .map(|(g, xs)| (g, DynConcrete::Set(xs)))
                .collect(),
            DynValue::Map(v) => v
                .get_guarded_values(ctx)
                .into_iter()
                .map(|(g, pairs)| (g, DynConcrete::Map(pairs)))
                .collect(),
        }
    }
}
